//! Single-slot shared memory cell
//!
//! There is no memory protection: every task holding the kernel reference
//! can read and write it.

use crate::message::MAX_PAYLOAD;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

#[allow(clippy::declare_interior_mutable_const)]
const ZERO_BYTE: AtomicU8 = AtomicU8::new(0);

/// Sequence-tagged snapshot cell
///
/// Each write overwrites the single buffer and bumps the sequence counter.
/// Readers get the freshest bytes plus the sequence number observed at read
/// time.
///
/// Nothing coordinates the byte copy with the sequence bump: a read racing
/// a write may return a sequence number newer or older than the bytes it
/// copied. Use this for advisory, loss-tolerant state (sensor snapshots,
/// frame counters), never as a substitute for a [`Mailbox`](crate::Mailbox).
///
/// # Example
///
/// ```
/// use ipc::SharedRegion;
///
/// let region = SharedRegion::new();
/// let seq = region.write(b"temp=21");
///
/// let mut buf = [0u8; 16];
/// let (read_seq, n) = region.read(&mut buf);
/// assert_eq!(read_seq, seq);
/// assert_eq!(&buf[..n], b"temp=21");
/// ```
pub struct SharedRegion {
    seq: AtomicU32,
    len: AtomicU32,
    buf: [AtomicU8; MAX_PAYLOAD],
}

impl SharedRegion {
    /// Returns an empty region with sequence number 0
    pub const fn new() -> Self {
        Self {
            seq: AtomicU32::new(0),
            len: AtomicU32::new(0),
            buf: [ZERO_BYTE; MAX_PAYLOAD],
        }
    }

    /// Overwrites the region with up to [`MAX_PAYLOAD`] bytes of `data`
    ///
    /// Returns the new sequence number.
    pub fn write(&self, data: &[u8]) -> u32 {
        let count = data.len().min(MAX_PAYLOAD);
        for (cell, &byte) in self.buf.iter().zip(&data[..count]) {
            cell.store(byte, Ordering::Relaxed);
        }
        self.len.store(count as u32, Ordering::Release);
        self.seq.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    /// Copies the current contents into `dst`
    ///
    /// Returns the sequence number and the number of bytes copied, which is
    /// `min(dst.len(), current length)`.
    pub fn read(&self, dst: &mut [u8]) -> (u32, usize) {
        let seq = self.seq.load(Ordering::Acquire);
        let count = (self.len.load(Ordering::Acquire) as usize).min(dst.len());
        for (out, cell) in dst[..count].iter_mut().zip(&self.buf) {
            *out = cell.load(Ordering::Relaxed);
        }
        (seq, count)
    }

    /// Returns the current sequence number
    pub fn seq(&self) -> u32 {
        self.seq.load(Ordering::Acquire)
    }

    /// Returns the length of the last write
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire) as usize
    }

    /// Returns true if the last write was empty (or nothing was written)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SharedRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SharedRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedRegion")
            .field("seq", &self.seq())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fresh_region_reads_nothing() {
        let region = SharedRegion::new();
        let mut buf = [0xFFu8; 8];
        assert_eq!(region.read(&mut buf), (0, 0));
        assert_eq!(buf, [0xFF; 8]);
        assert!(region.is_empty());
    }

    #[test]
    fn test_each_write_increases_sequence() {
        let region = SharedRegion::new();
        let mut buf = [0u8; 4];
        let mut last = region.read(&mut buf).0;
        for i in 0..10u8 {
            let seq = region.write(&[i]);
            let (read_seq, n) = region.read(&mut buf);
            assert_eq!(read_seq, seq);
            assert!(read_seq > last);
            assert_eq!(n, 1);
            assert_eq!(buf[0], i);
            last = read_seq;
        }
    }

    #[test]
    fn test_read_bounded_by_destination() {
        let region = SharedRegion::new();
        region.write(b"abcdefgh");
        let mut small = [0u8; 3];
        let (_, n) = region.read(&mut small);
        assert_eq!(n, 3);
        assert_eq!(&small, b"abc");
    }

    #[test]
    fn test_read_bounded_by_last_write() {
        let region = SharedRegion::new();
        region.write(b"a long first snapshot");
        region.write(b"short");
        let mut buf = [0u8; 64];
        let (seq, n) = region.read(&mut buf);
        assert_eq!(seq, 2);
        assert_eq!(&buf[..n], b"short");
    }

    #[test]
    fn test_write_truncates_to_max_payload() {
        let region = SharedRegion::new();
        let data = vec![7u8; MAX_PAYLOAD + 100];
        region.write(&data);
        assert_eq!(region.len(), MAX_PAYLOAD);
        let mut buf = vec![0u8; MAX_PAYLOAD + 100];
        let (_, n) = region.read(&mut buf);
        assert_eq!(n, MAX_PAYLOAD);
    }

    #[test]
    fn test_concurrent_reader_sees_monotonic_sequence() {
        let region = Arc::new(SharedRegion::new());
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let region = Arc::clone(&region);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut buf = [0u8; 8];
                let mut last = 0u32;
                while !done.load(Ordering::Acquire) {
                    let (seq, n) = region.read(&mut buf);
                    assert!(seq >= last, "sequence went backwards: {} < {}", seq, last);
                    assert!(n <= 8);
                    last = seq;
                }
            })
        };

        for i in 0..10_000u32 {
            region.write(&i.to_le_bytes());
        }
        done.store(true, Ordering::Release);
        reader.join().unwrap();
        assert_eq!(region.seq(), 10_000);
    }
}
