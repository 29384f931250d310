//! # Byte Sources
//!
//! Two ready-made [`ByteSource`] implementations:
//!
//! - [`MemorySource`] reads from a `bytes::Bytes` buffer.
//! - [`ReaderSource`] adapts any `Read + Seek` (files, cursors); the mark is a
//!   stream position and `reset()` seeks back to it.

use crate::error::SourceError;
use crate::traits::{ByteSource, ReadOutcome, SourceResult};
use bytes::Bytes;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

// ============================================================================
// MemorySource
// ============================================================================

/// Byte source over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
    position: usize,
    mark: Option<usize>,
    closed: bool,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            mark: None,
            closed: false,
        }
    }

    /// Current read position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left before end of data.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> SourceResult<()> {
        if self.closed {
            return Err(SourceError::Closed);
        }
        Ok(())
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<Bytes> for MemorySource {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<&'static [u8]> for MemorySource {
    fn from(data: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(data))
    }
}

impl ByteSource for MemorySource {
    fn read_byte(&mut self) -> SourceResult<Option<u8>> {
        self.ensure_open()?;
        let byte = self.data.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }

    fn read(&mut self, buf: &mut [u8]) -> SourceResult<ReadOutcome> {
        self.ensure_open()?;
        if self.remaining() == 0 {
            return Ok(ReadOutcome::EndOfData);
        }
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        Ok(ReadOutcome::Data(n))
    }

    fn mark(&mut self) -> SourceResult<()> {
        self.ensure_open()?;
        self.mark = Some(self.position);
        Ok(())
    }

    fn reset(&mut self) -> SourceResult<()> {
        self.ensure_open()?;
        self.position = self.mark.ok_or(SourceError::NoMark)?;
        Ok(())
    }

    fn close(&mut self) -> SourceResult<()> {
        self.closed = true;
        Ok(())
    }
}

// ============================================================================
// ReaderSource
// ============================================================================

/// Byte source over any seekable reader.
///
/// The reader is dropped on `close()`.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: Option<R>,
    mark: Option<u64>,
}

impl ReaderSource<BufReader<File>> {
    /// Open a file with buffered reads.
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        debug!("Opening byte source {:?}", path);
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: Some(reader),
            mark: None,
        }
    }

    /// Give back the reader, if the source has not been closed.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }

    fn reader(&mut self) -> SourceResult<&mut R> {
        self.inner.as_mut().ok_or(SourceError::Closed)
    }
}

impl<R: Read + Seek> ByteSource for ReaderSource<R> {
    fn read_byte(&mut self) -> SourceResult<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            ReadOutcome::Data(_) => Ok(Some(byte[0])),
            ReadOutcome::EndOfData => Ok(None),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> SourceResult<ReadOutcome> {
        let reader = self.reader()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }
        loop {
            match reader.read(buf) {
                Ok(0) => return Ok(ReadOutcome::EndOfData),
                Ok(n) => return Ok(ReadOutcome::Data(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn mark(&mut self) -> SourceResult<()> {
        let position = self.reader()?.stream_position()?;
        self.mark = Some(position);
        Ok(())
    }

    fn reset(&mut self) -> SourceResult<()> {
        let mark = self.mark.ok_or(SourceError::NoMark)?;
        self.reader()?.seek(SeekFrom::Start(mark))?;
        Ok(())
    }

    fn close(&mut self) -> SourceResult<()> {
        self.inner = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_memory_source_reads_then_reports_end() {
        let mut source = MemorySource::from(vec![1u8, 2, 3]);
        assert_eq!(source.read_byte().unwrap(), Some(1));

        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf).unwrap(), ReadOutcome::Data(2));
        assert_eq!(&buf[..2], &[2, 3]);
        assert_eq!(source.read(&mut buf).unwrap(), ReadOutcome::EndOfData);
        assert_eq!(source.read_byte().unwrap(), None);
    }

    #[test]
    fn test_memory_source_mark_and_reset() {
        let mut source = MemorySource::from(vec![10u8, 20, 30, 40]);
        assert!(matches!(source.reset(), Err(SourceError::NoMark)));

        source.read_byte().unwrap();
        source.mark().unwrap();
        source.read_byte().unwrap();
        source.read_byte().unwrap();
        source.reset().unwrap();
        assert_eq!(source.position(), 1);
        assert_eq!(source.read_byte().unwrap(), Some(20));
    }

    #[test]
    fn test_memory_source_rejects_reads_after_close() {
        let mut source = MemorySource::from(vec![1u8]);
        source.close().unwrap();
        source.close().unwrap();
        assert!(source.is_closed());
        assert!(matches!(source.read_byte(), Err(SourceError::Closed)));
    }

    #[test]
    fn test_reader_source_round_trips_through_mark() {
        let mut source = ReaderSource::new(Cursor::new(vec![5u8, 6, 7, 8, 9]));
        source.read_byte().unwrap();
        source.read_byte().unwrap();
        source.mark().unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(source.read(&mut buf).unwrap(), ReadOutcome::Data(3));
        assert_eq!(source.read(&mut buf).unwrap(), ReadOutcome::EndOfData);

        source.reset().unwrap();
        assert_eq!(source.read_byte().unwrap(), Some(7));
    }

    #[test]
    fn test_reader_source_close_drops_reader() {
        let mut source = ReaderSource::new(Cursor::new(vec![1u8, 2]));
        source.close().unwrap();
        assert!(matches!(source.read_byte(), Err(SourceError::Closed)));
        assert!(source.into_inner().is_none());
    }

    #[test]
    fn test_reader_source_open_missing_file_is_io_error() {
        let result = ReaderSource::open("/definitely/not/here.wav");
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
