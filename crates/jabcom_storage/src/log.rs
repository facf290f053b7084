//! Record log entries and their on-disk framing.
//!
//! Each entry is laid out as:
//!
//! ```text
//! magic (4) | version (2) | type (1) | length (4) | payload | crc32 (4)
//! ```
//!
//! All integers are little-endian. The CRC covers every byte before it.

use crate::error::{StorageError, StorageResult};
use jabcom_codec::{decode_key, decode_record, encode_key, encode_record, Key, Record};

/// Magic bytes at the start of every entry.
pub(crate) const LOG_MAGIC: [u8; 4] = *b"JREC";

/// Current entry format version.
pub(crate) const LOG_VERSION: u16 = 1;

/// magic (4) + version (2) + type (1) + length (4) = 11 bytes
const HEADER_SIZE: usize = 11;

const CRC_SIZE: usize = 4;

const TYPE_PUT: u8 = 1;
const TYPE_REMOVE: u8 = 2;
const TYPE_RESERVE: u8 = 3;

/// A single mutation of the record table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogEntry {
    /// A record was stored under its complete key.
    Put(Record),
    /// A record was removed.
    Remove(Key),
    /// Ids up to `last` are taken in `scope`.
    Reserve {
        /// Incomplete key naming the scope.
        scope: Key,
        /// Highest id handed out.
        last: u64,
    },
}

impl LogEntry {
    fn entry_type(&self) -> u8 {
        match self {
            Self::Put(_) => TYPE_PUT,
            Self::Remove(_) => TYPE_REMOVE,
            Self::Reserve { .. } => TYPE_RESERVE,
        }
    }

    fn encode_payload(&self) -> StorageResult<Vec<u8>> {
        match self {
            Self::Put(record) => Ok(encode_record(record)?),
            Self::Remove(key) => Ok(encode_key(key).into_bytes()),
            Self::Reserve { scope, last } => {
                let mut buf = last.to_le_bytes().to_vec();
                buf.extend_from_slice(encode_key(scope).as_bytes());
                Ok(buf)
            }
        }
    }

    fn decode_payload(entry_type: u8, payload: &[u8]) -> StorageResult<Self> {
        match entry_type {
            TYPE_PUT => Ok(Self::Put(decode_record(payload)?)),
            TYPE_REMOVE => Ok(Self::Remove(decode_key(payload_text(payload)?)?)),
            TYPE_RESERVE => {
                let (last, scope) = payload
                    .split_first_chunk::<8>()
                    .ok_or_else(|| StorageError::corrupted("reserve entry too short"))?;
                Ok(Self::Reserve {
                    scope: decode_key(payload_text(scope)?)?,
                    last: u64::from_le_bytes(*last),
                })
            }
            other => Err(StorageError::corrupted(format!(
                "unknown log entry type {other}"
            ))),
        }
    }

    /// Encodes the entry with its envelope.
    pub(crate) fn encode(&self) -> StorageResult<Vec<u8>> {
        let payload = self.encode_payload()?;
        let len = u32::try_from(payload.len())
            .map_err(|_| StorageError::corrupted("log entry payload too large"))?;

        let mut data = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
        data.extend_from_slice(&LOG_MAGIC);
        data.extend_from_slice(&LOG_VERSION.to_le_bytes());
        data.push(self.entry_type());
        data.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(&payload);

        let crc = compute_crc32(&data);
        data.extend_from_slice(&crc.to_le_bytes());
        Ok(data)
    }
}

fn payload_text(payload: &[u8]) -> StorageResult<&str> {
    std::str::from_utf8(payload).map_err(|_| StorageError::corrupted("log key is not UTF-8"))
}

/// Result of scanning a log image.
#[derive(Debug)]
pub(crate) struct LogScan {
    /// Entries in log order.
    pub(crate) entries: Vec<LogEntry>,
    /// Length of the valid prefix; bytes after it belong to a torn entry.
    pub(crate) valid_len: usize,
}

impl LogScan {
    /// Returns true if the log ends with a partially written entry.
    pub(crate) fn is_torn(&self, total_len: usize) -> bool {
        self.valid_len < total_len
    }
}

/// Parses every entry in `data`.
///
/// An incomplete entry, or a checksum mismatch in the last entry, marks a
/// torn tail and ends the scan. Any other damage is corruption.
pub(crate) fn scan(data: &[u8]) -> StorageResult<LogScan> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let rest = &data[pos..];
        if rest.len() < HEADER_SIZE {
            break;
        }
        if rest[0..4] != LOG_MAGIC {
            return Err(StorageError::corrupted(format!(
                "bad entry magic at offset {pos}"
            )));
        }
        let version = u16::from_le_bytes([rest[4], rest[5]]);
        if version != LOG_VERSION {
            return Err(StorageError::corrupted(format!(
                "unsupported log version {version} at offset {pos}"
            )));
        }
        let entry_type = rest[6];
        let len = u32::from_le_bytes([rest[7], rest[8], rest[9], rest[10]]) as usize;
        let total = HEADER_SIZE + len + CRC_SIZE;
        if rest.len() < total {
            if let Some(offset) = find_entry(&rest[HEADER_SIZE..]) {
                return Err(StorageError::corrupted(format!(
                    "entry at offset {pos} overruns the entry at offset {}",
                    pos + HEADER_SIZE + offset
                )));
            }
            break;
        }

        let body = &rest[..HEADER_SIZE + len];
        let stored_crc = u32::from_le_bytes([
            rest[HEADER_SIZE + len],
            rest[HEADER_SIZE + len + 1],
            rest[HEADER_SIZE + len + 2],
            rest[HEADER_SIZE + len + 3],
        ]);
        if compute_crc32(body) != stored_crc {
            if pos + total == data.len() {
                break;
            }
            return Err(StorageError::corrupted(format!(
                "checksum mismatch at offset {pos}"
            )));
        }

        entries.push(LogEntry::decode_payload(entry_type, &body[HEADER_SIZE..])?);
        pos += total;
    }

    Ok(LogScan {
        entries,
        valid_len: pos,
    })
}

/// Returns the size of the complete, checksummed entry at the start of `data`.
fn entry_len(data: &[u8]) -> Option<usize> {
    if data.len() < HEADER_SIZE || data[0..4] != LOG_MAGIC {
        return None;
    }
    let len = u32::from_le_bytes([data[7], data[8], data[9], data[10]]) as usize;
    let total = HEADER_SIZE.checked_add(len)?.checked_add(CRC_SIZE)?;
    if data.len() < total {
        return None;
    }
    let crc_at = HEADER_SIZE + len;
    let stored_crc = u32::from_le_bytes([
        data[crc_at],
        data[crc_at + 1],
        data[crc_at + 2],
        data[crc_at + 3],
    ]);
    (compute_crc32(&data[..crc_at]) == stored_crc).then_some(total)
}

/// Finds the offset of the first complete entry inside `data`.
///
/// A torn tail holds the prefix of a single entry, so a whole entry after a
/// truncated header means the header itself is damaged.
fn find_entry(data: &[u8]) -> Option<usize> {
    data.windows(LOG_MAGIC.len())
        .enumerate()
        .filter(|(_, window)| *window == LOG_MAGIC)
        .find_map(|(offset, _)| entry_len(&data[offset..]).map(|_| offset))
}

/// Computes CRC32 checksum for data.
pub(crate) fn compute_crc32(data: &[u8]) -> u32 {
    // Table-driven CRC32 (IEEE polynomial)
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}
