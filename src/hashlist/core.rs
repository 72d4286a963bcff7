//! Component I: the hash-list parser.
//!
//! Two-stage auto-detection (§4.I): a binary EnCase v5 header check first
//! (it has no line structure to confuse with text), then native
//! HASHDEEP-1.0, then the closed set of rigid CSV headers (Hashkeeper,
//! NSRL 1.5/2.0, iLook v1/v3), then a scan for BSD / md5deep-size / plain
//! line shapes. The per-format line matchers are manual byte-index checks,
//! mirroring `find_plain_hash` / `find_md5deep_size_hash` in
//! `original_source/hashdeep/files.cpp` rather than a regex crate.
//!
//! Unlike the original streaming C parser, this implementation reads the
//! whole hash-list file into memory before parsing — hash-list files are
//! orders of magnitude smaller than the data being hashed, so the
//! simplicity is worth the tradeoff (see DESIGN.md).

use crate::algorithms::AlgorithmId;
use crate::store::{FileRecord, KnownHashStore};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("I/O error reading hash list: {0}")]
    Io(#[from] std::io::Error),
    #[error("unrecognized hash-list format")]
    UnrecognizedFormat,
    #[error("malformed HASHDEEP-1.0 header: {0}")]
    MalformedNativeHeader(String),
    #[error("malformed EnCase hash-set header")]
    MalformedEncaseHeader,
}

/// One bad record: line number (1-based) and why it was dropped. Parsing
/// continues past these (§4.I, §7 "Invalid hash-list record").
#[derive(Debug, Clone)]
pub struct BadRecord {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct ParseReport {
    pub format: DetectedFormat,
    pub records_added: usize,
    pub bad_records: Vec<BadRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedFormat {
    Plain,
    Md5deepSize,
    Bsd,
    Rigid(RigidKind),
    Hashdeep1_0(Vec<AlgorithmId>),
    EncaseV5 { hash_count: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidKind {
    Hashkeeper,
    Nsrl15,
    Nsrl20,
    ILookV1,
    ILookV3,
}

struct RigidSpec {
    kind: RigidKind,
    header: &'static str,
    /// 1-indexed.
    filename_col: usize,
    /// 1-indexed column per algorithm this format carries.
    hash_cols: &'static [(AlgorithmId, usize)],
}

const RIGID_SPECS: &[RigidSpec] = &[
    RigidSpec {
        kind: RigidKind::Hashkeeper,
        header: "\"file_id\",\"hashset_id\",\"file_name\",\"directory\",\"hash\",\"file_size\",\"date_modified\",\"time_modified\",\"time_zone\",\"comments\",\"date_accessed\",\"time_accessed\"",
        filename_col: 3,
        hash_cols: &[(AlgorithmId::Md5, 5)],
    },
    RigidSpec {
        kind: RigidKind::Nsrl15,
        header: "\"SHA-1\",\"FileName\",\"FileSize\",\"ProductCode\",\"OpSystemCode\",\"MD4\",\"MD5\",\"CRC32\",\"SpecialCode\"",
        filename_col: 2,
        hash_cols: &[(AlgorithmId::Sha1, 1), (AlgorithmId::Md5, 7)],
    },
    RigidSpec {
        kind: RigidKind::Nsrl20,
        header: "\"SHA-1\",\"MD5\",\"CRC32\",\"FileName\",\"FileSize\",\"ProductCode\",\"OpSystemCode\",\"SpecialCode\"",
        filename_col: 4,
        hash_cols: &[(AlgorithmId::Sha1, 1), (AlgorithmId::Md5, 2)],
    },
    RigidSpec {
        kind: RigidKind::ILookV1,
        header: "V1Hash,HashType,SetDescription,FileName,FilePath,FileSize",
        filename_col: 4,
        hash_cols: &[(AlgorithmId::Md5, 1)],
    },
    RigidSpec {
        kind: RigidKind::ILookV3,
        header: "V3Hash,HashSHA1,FileName,FilePath,FileSize,HashSHA256,HashSHA384,HashSHA512",
        filename_col: 3,
        hash_cols: &[
            (AlgorithmId::Md5, 1),
            (AlgorithmId::Sha1, 2),
            (AlgorithmId::Sha256, 6),
        ],
    },
];

/// iLook v4 adds trailing timestamp columns but is otherwise identical to
/// v3 and is parsed the same way — the original detector maps it straight
/// to `TYPE_ILOOK3` (`files.cpp`).
const ILOOK_V4_HEADER: &str =
    "V4Hash,HashSHA1,FileName,FilePath,FileSize,HashSHA256,HashSHA384,HashSHA512,CreateTime,ModTime,LastAccessTime";

const ENCASE_MAGIC: &[u8; 8] = b"HASH\r\n\xff\x00";
const ENCASE_RECORD_OFFSET: u64 = 0x480;
const ENCASE_RECORD_LEN: usize = 18;

/// Loads and parses `data` (the entire hash-list file), adding every valid
/// record into `store`.
pub fn load(data: &[u8], active: &[AlgorithmId], store: &mut KnownHashStore) -> Result<ParseReport, ParseError> {
    if data.len() >= 8 && &data[..8] == ENCASE_MAGIC {
        return load_encase(data, store);
    }

    let text = String::from_utf8_lossy(data);
    let first = text.lines().next().unwrap_or("").trim_end();

    if first == "%%%% HASHDEEP-1.0" {
        return load_hashdeep_native(&text, store);
    }

    if let Some(spec) = RIGID_SPECS.iter().find(|s| s.header == first) {
        return load_rigid(&text, spec, store);
    }
    if first == ILOOK_V4_HEADER {
        let v3 = RIGID_SPECS.iter().find(|s| s.kind == RigidKind::ILookV3).unwrap();
        return load_rigid(&text, v3, store);
    }

    load_line_oriented(&text, active, store)
}

fn split_columns(line: &str) -> Vec<String> {
    let mut cols = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cols.push(std::mem::take(&mut cur));
            }
            other => cur.push(other),
        }
    }
    cols.push(cur);
    cols
}

fn load_rigid(text: &str, spec: &RigidSpec, store: &mut KnownHashStore) -> Result<ParseReport, ParseError> {
    let mut bad_records = Vec::new();
    let mut added = 0usize;
    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        if lineno == 1 || line.is_empty() || line.starts_with('#') {
            continue;
        }
        let cols = split_columns(line);
        let Some(file_name) = cols.get(spec.filename_col - 1) else {
            bad_records.push(BadRecord { line: lineno, reason: "missing filename column".to_string() });
            continue;
        };
        let mut record = FileRecord::new(file_name.clone(), 0);
        let mut any_hash = false;
        for &(id, col) in spec.hash_cols {
            let Some(hex) = cols.get(col - 1) else { continue };
            let hex = hex.to_ascii_lowercase();
            if crate::algorithms::AlgorithmRegistry::valid_hash(id, &hex) {
                record.hash_hex.insert(id, hex);
                any_hash = true;
            }
        }
        if !any_hash {
            bad_records.push(BadRecord { line: lineno, reason: "no valid hash column".to_string() });
            continue;
        }
        store.add(record);
        added += 1;
    }
    Ok(ParseReport {
        format: DetectedFormat::Rigid(spec.kind),
        records_added: added,
        bad_records,
    })
}

fn load_hashdeep_native(text: &str, store: &mut KnownHashStore) -> Result<ParseReport, ParseError> {
    let mut lines = text.lines();
    let _ = lines.next();
    let header = lines
        .next()
        .ok_or_else(|| ParseError::MalformedNativeHeader("missing column header line".to_string()))?
        .trim_end();
    let rest = header
        .strip_prefix("%%%% ")
        .ok_or_else(|| ParseError::MalformedNativeHeader(header.to_string()))?;
    let columns: Vec<&str> = rest.split(',').collect();
    if columns.len() < 3 || columns[0] != "size" || columns.last() != Some(&"filename") {
        return Err(ParseError::MalformedNativeHeader(header.to_string()));
    }
    let algo_columns: Vec<AlgorithmId> = columns[1..columns.len() - 1]
        .iter()
        .filter_map(|name| AlgorithmId::parse(name))
        .collect();

    let mut bad_records = Vec::new();
    let mut added = 0usize;
    for (idx, line) in text.lines().enumerate().skip(2) {
        let lineno = idx + 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let expected_columns = algo_columns.len() + 2;
        let Some((head, filename)) = split_at_nth_comma(line, expected_columns - 1) else {
            bad_records.push(BadRecord { line: lineno, reason: "too few columns".to_string() });
            continue;
        };
        let head_cols: Vec<&str> = head.split(',').collect();
        let Some(size) = head_cols.first().and_then(|s| s.parse::<u64>().ok()) else {
            bad_records.push(BadRecord { line: lineno, reason: "invalid size column".to_string() });
            continue;
        };
        let mut record = FileRecord::new(filename.to_string(), size);
        for (i, &id) in algo_columns.iter().enumerate() {
            let Some(hex) = head_cols.get(i + 1) else { continue };
            let hex = hex.to_ascii_lowercase();
            if crate::algorithms::AlgorithmRegistry::valid_hash(id, &hex) {
                record.hash_hex.insert(id, hex);
            }
        }
        store.add(record);
        added += 1;
    }
    Ok(ParseReport {
        format: DetectedFormat::Hashdeep1_0(algo_columns),
        records_added: added,
        bad_records,
    })
}

/// Splits `line` after its `n`th comma (0-indexed), returning `(head,
/// tail)`; the HASHDEEP-1.0 filename column may itself contain commas, so
/// it is everything after the `expected_columns - 1`th separator (§4.I).
fn split_at_nth_comma(line: &str, n: usize) -> Option<(&str, &str)> {
    let mut pos = 0;
    let bytes = line.as_bytes();
    let mut seen = 0;
    while pos < bytes.len() {
        if bytes[pos] == b',' {
            seen += 1;
            if seen == n + 1 {
                return Some((&line[..pos], &line[pos + 1..]));
            }
        }
        pos += 1;
    }
    None
}

/// Plain / md5deep-size / BSD line-oriented formats (§4.I). The format is
/// decided by the first non-comment, non-empty line, then applied to the
/// whole file.
fn load_line_oriented(text: &str, active: &[AlgorithmId], store: &mut KnownHashStore) -> Result<ParseReport, ParseError> {
    let first_data_line = text
        .lines()
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .ok_or(ParseError::UnrecognizedFormat)?;

    let format = if parse_bsd_line(first_data_line, active).is_some() {
        DetectedFormat::Bsd
    } else if parse_md5deep_size_line(first_data_line, active).is_some() {
        DetectedFormat::Md5deepSize
    } else if parse_plain_line(first_data_line, active).is_some() {
        DetectedFormat::Plain
    } else {
        return Err(ParseError::UnrecognizedFormat);
    };

    let mut bad_records = Vec::new();
    let mut added = 0usize;
    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = match format {
            DetectedFormat::Bsd => parse_bsd_line(line, active),
            DetectedFormat::Md5deepSize => parse_md5deep_size_line(line, active),
            DetectedFormat::Plain => parse_plain_line(line, active),
            _ => unreachable!(),
        };
        match parsed {
            Some((id, hex, size, name)) => {
                let mut record = FileRecord::new(name, size.unwrap_or(0));
                record.hash_hex.insert(id, hex);
                store.add(record);
                added += 1;
            }
            None => bad_records.push(BadRecord { line: lineno, reason: "does not match detected format".to_string() }),
        }
    }
    Ok(ParseReport { format, records_added: added, bad_records })
}

/// `ALG (filename) = hex`.
fn parse_bsd_line(line: &str, active: &[AlgorithmId]) -> Option<(AlgorithmId, String, Option<u64>, String)> {
    let open = line.find(" (")?;
    let close = line.rfind(") = ")?;
    if close <= open {
        return None;
    }
    let alg_name = &line[..open];
    let filename = &line[open + 2..close];
    let hex = &line[close + 4..];
    let id = active.iter().copied().find(|id| id.name().eq_ignore_ascii_case(alg_name))?;
    let hex = hex.trim().to_ascii_lowercase();
    if !crate::algorithms::AlgorithmRegistry::valid_hash(id, &hex) {
        return None;
    }
    Some((id, hex, None, filename.to_string()))
}

/// `<10-digit-size><space><space><hex><space><filename>`.
fn parse_md5deep_size_line(line: &str, active: &[AlgorithmId]) -> Option<(AlgorithmId, String, Option<u64>, String)> {
    let bytes = line.as_bytes();
    if bytes.len() < 12 {
        return None;
    }
    let digits_end = bytes[..10.min(bytes.len())]
        .iter()
        .position(|b| !b.is_ascii_digit() && *b != b' ')
        .unwrap_or(bytes.len().min(10));
    if digits_end == 0 {
        return None;
    }
    if !line[digits_end..].starts_with("  ") {
        return None;
    }
    let size: u64 = line[..digits_end].trim().parse().ok()?;
    let rest = &line[digits_end + 2..];
    let (id, hex, filename) = match_plain_hash(rest, active)?;
    Some((id, hex, Some(size), filename))
}

/// `<hex><space><filename>`.
fn parse_plain_line(line: &str, active: &[AlgorithmId]) -> Option<(AlgorithmId, String, Option<u64>, String)> {
    let (id, hex, filename) = match_plain_hash(line, active)?;
    Some((id, hex, None, filename))
}

fn match_plain_hash(buf: &str, active: &[AlgorithmId]) -> Option<(AlgorithmId, String, String)> {
    for &id in active {
        let len = id.hex_len();
        if buf.len() <= len {
            continue;
        }
        if buf.as_bytes()[len] != b' ' {
            continue;
        }
        let candidate = &buf[..len];
        let hex = candidate.to_ascii_lowercase();
        if crate::algorithms::AlgorithmRegistry::valid_hash(id, &hex) {
            let filename = buf[len..].trim_start().to_string();
            if !filename.is_empty() {
                return Some((id, hex, filename));
            }
        }
    }
    None
}

fn load_encase(data: &[u8], store: &mut KnownHashStore) -> Result<ParseReport, ParseError> {
    if data.len() < 20 {
        return Err(ParseError::MalformedEncaseHeader);
    }
    let version_padding_count = &data[8..20];
    let count_le = u32::from_le_bytes(version_padding_count[8..12].try_into().unwrap());
    let count_be = u32::from_be_bytes(version_padding_count[8..12].try_into().unwrap());
    // Prefer whichever endianness produces a record count that actually
    // fits the file; EnCase hash sets are little-endian in practice but
    // §4.I asks us to tolerate either.
    let records_start = ENCASE_RECORD_OFFSET as usize;
    let fits = |count: u32| records_start + (count as usize) * ENCASE_RECORD_LEN <= data.len();
    let hash_count = if fits(count_le) {
        count_le
    } else if fits(count_be) {
        count_be
    } else {
        return Err(ParseError::MalformedEncaseHeader);
    };

    let mut added = 0usize;
    for i in 0..hash_count as usize {
        let start = records_start + i * ENCASE_RECORD_LEN;
        let digest = &data[start..start + 16];
        let hex = crate::common::hex_encode(digest);
        let mut record = FileRecord::new(format!("encase-record-{i}"), 0);
        record.hash_hex.insert(AlgorithmId::Md5, hex);
        store.add(record);
        added += 1;
    }

    Ok(ParseReport {
        format: DetectedFormat::EncaseV5 { hash_count },
        records_added: added,
        bad_records: Vec::new(),
    })
}

/// Writes the native HASHDEEP-1.0 two-line header plus one CSV record per
/// record in `records`, in `column_order` (§4.A, §6).
pub fn write_native_header(
    out: &mut dyn std::io::Write,
    column_order: &[AlgorithmId],
) -> std::io::Result<()> {
    writeln!(out, "%%%% HASHDEEP-1.0")?;
    let algos: Vec<String> = column_order.iter().map(|a| a.name().to_string()).collect();
    writeln!(out, "%%%% size,{},filename", algos.join(","))
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
