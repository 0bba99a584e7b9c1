//! Writes wavetables as WAV files.
//!
//! The container is a standard RIFF/WAVE file holding the samples as mono
//! 32-bit float data, with two extra chunks: a "clm " descriptor telling
//! wavetable-aware hosts the subtable length, and a "WTFs" chunk carrying
//! the generator script verbatim, so the table can be reproduced from the
//! file alone.
//!
//! The RIFF and fmt chunk sizes are only known after their payload has
//! been written. On seekable destinations the writer emits zero
//! placeholders, remembers the positions and patches them afterwards. For
//! destinations that cannot seek, to_bytes() renders the complete file
//! into memory first, so the byte stream leaves the writer already
//! correct.

use super::wavetable::Wavetable;

use std::fs::File;
use std::io::prelude::*;
use std::io::{Cursor, SeekFrom};

use log::{debug, error, info};

// List of Chunk IDs as u32 values (little endian)
const CID_RIFF: u32 = 0x46464952;
const CID_WAVE: u32 = 0x45564157;
const CID_FMT: u32 = 0x20746d66;
const CID_FACT: u32 = 0x74636166;
const CID_DATA: u32 = 0x61746164;
const CID_CLM: u32 = 0x206d6c63;
const CID_WTFS: u32 = 0x73465457;

const SAMPLE_RATE: u32 = 44100;
const NUM_CHANNELS: u16 = 1;

// Largest subtable length the "clm " descriptor can announce.
const MAX_CLM_FRAMES: usize = 8192;

fn write_u16<W: Write>(dest: &mut W, value: u16) -> Result<(), std::io::Error> {
    dest.write_all(&value.to_le_bytes())
}

fn write_u32<W: Write>(dest: &mut W, value: u32) -> Result<(), std::io::Error> {
    dest.write_all(&value.to_le_bytes())
}

fn write_f32<W: Write>(dest: &mut W, value: f32) -> Result<(), std::io::Error> {
    dest.write_all(&value.to_le_bytes())
}

pub struct WavWriter;

/// Handles writing of wavetables to WAV files.
impl WavWriter {
    /// Write the wavetable to a seekable destination.
    ///
    /// `source` is the script the table was generated from; it is stored
    /// in the "WTFs" chunk when non-empty and never interpreted. The RIFF
    /// and fmt sizes are back-patched through the Seek interface, and the
    /// stream position is left at the end of the file.
    ///
    /// Any I/O error aborts the write; the destination must then be
    /// considered unusable and removed by the caller.
    ///
    /// ```
    /// use wavescript::{Wavetable, WavWriter};
    /// use std::io::Cursor;
    ///
    /// let wt = Wavetable::from_samples(2, 4, vec![0.0; 8]).unwrap();
    /// let mut buffer = Cursor::new(Vec::new());
    /// WavWriter::write(&mut buffer, &wt, "wave = X*0;").unwrap();
    /// assert_eq!(&buffer.get_ref()[0..4], b"RIFF");
    /// ```
    pub fn write<W: Write + Seek>(
        dest: &mut W,
        wt: &Wavetable,
        source: &str,
    ) -> Result<(), std::io::Error> {
        let count = wt.count();
        let frames = wt.frames();
        info!("Writing wavetable: {} subtables with {} frames", count, frames);

        // RIFF header with placeholder size
        write_u32(dest, CID_RIFF)?;
        write_u32(dest, 0)?;
        let riff_start = dest.seek(SeekFrom::Current(0))?;
        write_u32(dest, CID_WAVE)?;

        // fmt chunk with placeholder size
        write_u32(dest, CID_FMT)?;
        write_u32(dest, 0)?;
        let fmt_start = dest.seek(SeekFrom::Current(0))?;
        write_u16(dest, 3)?; // IEEE float
        write_u16(dest, NUM_CHANNELS)?;
        write_u32(dest, SAMPLE_RATE)?;
        write_u32(dest, SAMPLE_RATE * NUM_CHANNELS as u32 * 4)?; // bytes per second
        write_u16(dest, NUM_CHANNELS * 4)?; // frame alignment
        write_u16(dest, 32)?; // bits per sample
        write_u16(dest, 0)?; // extension size
        let fmt_end = dest.seek(SeekFrom::Current(0))?;

        // fact chunk
        write_u32(dest, CID_FACT)?;
        write_u32(dest, 4)?;
        write_u32(dest, (count * frames) as u32)?;

        // data chunk
        debug!("Writing data chunk, {} samples", wt.num_samples());
        write_u32(dest, CID_DATA)?;
        write_u32(dest, (NUM_CHANNELS as usize * count * frames * 4) as u32)?;
        for sample in wt.samples() {
            write_f32(dest, *sample)?;
        }

        // clm chunk, announcing the subtable length to wavetable hosts
        if frames <= MAX_CLM_FRAMES {
            let descriptor = WavWriter::clm_descriptor(frames);
            debug!("Writing clm chunk: [{}]", descriptor);
            write_u32(dest, CID_CLM)?;
            write_u32(dest, descriptor.len() as u32)?;
            dest.write_all(descriptor.as_bytes())?;
        }

        // code chunk, carrying the script padded to an even byte count
        if !source.is_empty() {
            let mut code = source.as_bytes().to_vec();
            if code.len() & 1 == 1 {
                code.push(0);
            }
            debug!("Writing code chunk, {} bytes", code.len());
            write_u32(dest, CID_WTFS)?;
            write_u32(dest, code.len() as u32)?;
            dest.write_all(&code)?;
        }

        let riff_end = dest.seek(SeekFrom::Current(0))?;

        // Patch the two placeholder sizes
        dest.flush()?;
        dest.seek(SeekFrom::Start(fmt_start - 4))?;
        write_u32(dest, (fmt_end - fmt_start) as u32)?;
        dest.seek(SeekFrom::Start(riff_start - 4))?;
        write_u32(dest, (riff_end - riff_start) as u32)?;
        dest.seek(SeekFrom::Start(riff_end))?;
        dest.flush()?;

        Ok(())
    }

    /// Render the complete file into a byte buffer.
    ///
    /// The returned bytes already contain the correct chunk sizes, so they
    /// can be streamed to destinations that do not support seeking.
    pub fn to_bytes(wt: &Wavetable, source: &str) -> Result<Vec<u8>, std::io::Error> {
        let mut buffer = Cursor::new(Vec::new());
        WavWriter::write(&mut buffer, wt, source)?;
        Ok(buffer.into_inner())
    }

    /// Write the wavetable to a non-seekable destination.
    ///
    /// Builds the file in memory first, then streams it out in one piece.
    pub fn write_stream<W: Write>(
        dest: &mut W,
        wt: &Wavetable,
        source: &str,
    ) -> Result<(), std::io::Error> {
        let bytes = WavWriter::to_bytes(wt, source)?;
        dest.write_all(&bytes)?;
        dest.flush()
    }

    /// Write the wavetable to a file with the given name.
    ///
    /// A destination that could not be written completely is removed again,
    /// so no truncated file with stale size fields is left behind.
    pub fn write_file(wt: &Wavetable, source: &str, filename: &str) -> Result<(), std::io::Error> {
        let mut file = File::create(filename)?;
        if let Err(e) = WavWriter::write(&mut file, wt, source) {
            error!("Writing [{}] failed: {}", filename, e);
            drop(file);
            let _ = std::fs::remove_file(filename);
            return Err(e);
        }
        Ok(())
    }

    // Build the "clm " descriptor string: a fixed marker, the subtable
    // length as four decimal digits, a capability mask and a provenance
    // tag.
    fn clm_descriptor(frames: usize) -> String {
        format!("<!>{:04} 10000000 wavetable (jpcima.sdf1.org)", frames)
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------
