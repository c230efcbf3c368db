//! Store file framing
//!
//! Layout: `"SOUB" ‖ version(1) ‖ envelope`, where the 5-byte header is bound
//! into the GCM tag as associated data. Files without the magic are the
//! headerless layout written by earlier releases and are read as a bare
//! envelope.

use crate::crypto::ENVELOPE_OVERHEAD;
use crate::error::{Result, SoubiError};

/// Magic bytes opening every framed store file
pub const MAGIC: [u8; 4] = *b"SOUB";
/// Current format version
pub const FORMAT_VERSION: u8 = 1;
/// Length of `MAGIC ‖ version`
pub const HEADER_LENGTH: usize = MAGIC.len() + 1;

/// A store file split into its authenticated header and AEAD envelope
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Framed<'a> {
    /// Header bytes, empty for headerless files
    pub aad: &'a [u8],
    /// `nonce ‖ tag ‖ ciphertext`
    pub envelope: &'a [u8],
}

/// Header written in front of every new envelope
pub(crate) fn header() -> [u8; HEADER_LENGTH] {
    let mut header = [0u8; HEADER_LENGTH];
    header[..MAGIC.len()].copy_from_slice(&MAGIC);
    header[MAGIC.len()] = FORMAT_VERSION;
    header
}

/// Split raw file contents. Unknown versions are rejected rather than
/// reported as corruption, unless the envelope is too short to hold any
/// data, in which case the caller sees an empty store.
pub(crate) fn split(contents: &[u8]) -> Result<Framed<'_>> {
    if contents.len() >= HEADER_LENGTH && contents[..MAGIC.len()] == MAGIC {
        let (aad, envelope) = contents.split_at(HEADER_LENGTH);
        let version = contents[MAGIC.len()];
        if version != FORMAT_VERSION && envelope.len() >= ENVELOPE_OVERHEAD {
            return Err(SoubiError::UnsupportedFormat(version));
        }
        return Ok(Framed { aad, envelope });
    }

    Ok(Framed {
        aad: &[],
        envelope: contents,
    })
}
