//! Locating the upgrade entry point in a generated revision script.
//!
//! A small line tokenizer walks the script, skipping triple-quoted string
//! bodies, and recognises a column-zero `def upgrade()` signature with an
//! optional `-> None` annotation. The result is an explicit byte offset just
//! past the signature's colon, which is where schema statements are spliced.

/// Where a statement may be inserted after the upgrade signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    /// Byte offset immediately after the signature's `:`.
    pub offset: usize,
    /// 1-based line number of the signature.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Splice {
    Inserted(String),
    AlreadyPresent,
}

const SCHEMA_STATEMENT_PREFIX: &str = "op.execute('CREATE SCHEMA IF NOT EXISTS ";

pub fn schema_statement(schema: &str) -> String {
    format!("{SCHEMA_STATEMENT_PREFIX}{schema}')")
}

/// Find the first top-level `def upgrade() -> None:` outside string literals.
pub fn find_upgrade_signature(source: &str) -> Option<InsertionPoint> {
    let mut offset = 0;
    let mut open_quote: Option<&str> = None;

    for (idx, line) in source.split_inclusive('\n').enumerate() {
        if open_quote.is_none() {
            if let Some(len) = match_signature(line) {
                return Some(InsertionPoint {
                    offset: offset + len,
                    line: idx + 1,
                });
            }
        }
        open_quote = track_triple_quotes(line, open_quote);
        offset += line.len();
    }
    None
}

/// Insert the schema-creation statement right after the upgrade signature.
///
/// Returns `None` when the signature is missing; the caller must leave the
/// file untouched in that case.
pub fn splice_schema_statement(source: &str, schema: &str) -> Option<Splice> {
    let point = find_upgrade_signature(source)?;
    let statement = schema_statement(schema);

    if leading_schema_statements(source, point).any(|l| l == statement) {
        return Some(Splice::AlreadyPresent);
    }

    let insert = format!("\n    {statement}\n");
    let mut out = String::with_capacity(source.len() + insert.len());
    out.push_str(&source[..point.offset]);
    out.push_str(&insert);
    out.push_str(&source[point.offset..]);
    Some(Splice::Inserted(out))
}

/// Schema statements stacked directly under the signature, before any
/// other statement of the upgrade body. Blank lines are skipped.
fn leading_schema_statements(source: &str, point: InsertionPoint) -> impl Iterator<Item = &str> {
    source[point.offset..]
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take_while(|l| l.starts_with(SCHEMA_STATEMENT_PREFIX))
}

/// Length of the signature prefix of `line`, if the line opens with one.
fn match_signature(line: &str) -> Option<usize> {
    let mut cur = Cursor::new(line);
    cur.keyword("def")?;
    if cur.skip_blanks() == 0 {
        return None;
    }
    cur.keyword("upgrade")?;
    cur.skip_blanks();
    cur.literal("(")?;
    cur.skip_blanks();
    cur.literal(")")?;
    cur.skip_blanks();
    if cur.literal("->").is_some() {
        cur.skip_blanks();
        cur.keyword("None")?;
        cur.skip_blanks();
    }
    cur.literal(":")?;
    Some(cur.pos)
}

/// Update the open triple-quote state after scanning `line`.
fn track_triple_quotes<'q>(line: &str, mut open: Option<&'q str>) -> Option<&'q str> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match open {
            Some(q) => {
                if bytes[i..].starts_with(q.as_bytes()) {
                    open = None;
                    i += 3;
                    continue;
                }
            }
            None => {
                if bytes[i] == b'#' {
                    break;
                }
                if bytes[i..].starts_with(b"\"\"\"") {
                    open = Some("\"\"\"");
                    i += 3;
                    continue;
                }
                if bytes[i..].starts_with(b"'''") {
                    open = Some("'''");
                    i += 3;
                    continue;
                }
            }
        }
        i += 1;
    }
    open
}

struct Cursor<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn literal(&mut self, lit: &str) -> Option<()> {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            Some(())
        } else {
            None
        }
    }

    /// A literal that must not be followed by an identifier character.
    fn keyword(&mut self, word: &str) -> Option<()> {
        let rest = self.rest();
        if !rest.starts_with(word) {
            return None;
        }
        let next = rest[word.len()..].chars().next();
        if next.is_some_and(|c| c.is_alphanumeric() || c == '_') {
            return None;
        }
        self.pos += word.len();
        Some(())
    }

    fn skip_blanks(&mut self) -> usize {
        let skipped = self
            .rest()
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        self.pos += skipped;
        skipped
    }
}
