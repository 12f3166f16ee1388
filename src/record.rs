/// One input line, carried through queues and written to shard files as
/// `"<text>\t<pos>\n"`. `text` is byte-transparent — it need not be valid
/// UTF-8, since the input file is only guaranteed "UTF-8 or byte-transparent
/// text".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub text: Vec<u8>,
    pub pos: u64,
}

impl Record {
    pub fn new(text: impl AsRef<[u8]>, pos: u64) -> Self {
        Self { text: text.as_ref().to_vec(), pos }
    }

    /// Parse a shard-file line of the form `"<text>\t<pos>"` (no trailing newline).
    /// `text` must not itself contain a TAB (undefined behavior if it does),
    /// so splitting on the *first* TAB is sufficient and correct. `text` is
    /// carried through as raw bytes; only `pos` is required to be UTF-8
    /// (it's decimal digits).
    pub fn parse_shard_line(line: &[u8], path: &std::path::Path) -> Result<Self, crate::errors::PipelineError> {
        let malformed = || crate::errors::PipelineError::MalformedShard {
            path: path.to_path_buf(),
            line: String::from_utf8_lossy(line).into_owned(),
        };

        let tab_idx = line.iter().position(|&b| b == b'\t').ok_or_else(malformed)?;
        let (text, rest) = line.split_at(tab_idx);
        let pos_bytes = &rest[1..];

        let pos_str = std::str::from_utf8(pos_bytes).map_err(|_| malformed())?;
        let pos = pos_str.parse::<u64>().map_err(|_| malformed())?;

        Ok(Record { text: text.to_vec(), pos })
    }

    pub fn to_line(&self) -> Vec<u8> {
        let mut line = Vec::with_capacity(self.text.len() + 24);
        line.extend_from_slice(&self.text);
        line.push(b'\t');
        line.extend_from_slice(self.pos.to_string().as_bytes());
        line.push(b'\n');
        line
    }
}

/// In-memory bookkeeping for a single `text`: first-seen position and
/// occurrence count. Lives only inside a round's or shard's dedup mapping.
#[derive(Clone, Debug)]
pub struct DedupEntry {
    pub pos: u64,
    pub repeat: u64,
}

impl DedupEntry {
    pub fn first_seen(pos: u64) -> Self {
        Self { pos, repeat: 1 }
    }

    pub fn bump(&mut self) {
        self.repeat += 1;
    }
}

/// Scan a dedup mapping for the unique (`repeat == 1`) entry with the smallest `pos`.
pub fn min_unique(map: &ahash::AHashMap<Vec<u8>, DedupEntry>) -> Option<Record> {
    map.iter()
        .filter(|(_, e)| e.repeat == 1)
        .min_by_key(|(_, e)| e.pos)
        .map(|(text, e)| Record::new(text, e.pos))
}
