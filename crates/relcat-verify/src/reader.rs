use std::io::{self, Read};

use crate::Hasher;

/// Reader that hashes data as it passes through.
pub struct DigestReader<R, H> {
    reader: R,
    hasher: H,
    read:   u64,
}

impl<R, H> DigestReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            hasher,
            read: 0,
        }
    }

    /// Bytes read so far.
    pub fn bytes_read(&self) -> u64 { self.read }
}

impl<R: Read, H: Hasher> DigestReader<R, H> {
    /// Drains the remaining input and returns the digest of everything read.
    pub fn finish(mut self) -> io::Result<Vec<u8>> {
        io::copy(&mut self, &mut io::sink())?;
        Ok(self.hasher.finalize())
    }
}

impl<R: Read, H: Hasher> Read for DigestReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.read += n as u64;
        }
        Ok(n)
    }
}
