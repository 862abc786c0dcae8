//! Tab-separated document records.
//!
//! Two field orders are understood. The canonical one is
//! `id [rlev] year p1 p2 p3 p4 title abstract` and the raw one is
//! `id [rlev] title abstract year p1 p2 p3 p4`. The `rlev` column is present
//! in labeled records only.

/// Number of externally supplied reference probabilities per record.
pub const N_REFERENCE_PROBS: usize = 4;

/// Largest accepted relevance level.
///
/// Class-indexed vectors are sized by the largest label, so labels are bounded.
pub const MAX_RLEV: u32 = 1024;

const N_UNLABELED_FIELDS: usize = 8;
const N_LABELED_FIELDS: usize = 9;

/// Parses a relevance level in `1..=MAX_RLEV`.
pub fn parse_rlev(s: &str) -> Option<u32> {
    s.trim()
        .parse()
        .ok()
        .filter(|rlev| (1..=MAX_RLEV).contains(rlev))
}

fn parse_year(s: &str) -> Option<i32> {
    s.trim().parse().ok()
}

fn parse_probs(fields: &[&str]) -> Option<[f64; N_REFERENCE_PROBS]> {
    let mut probs = [0.0; N_REFERENCE_PROBS];
    if fields.len() != N_REFERENCE_PROBS {
        return None;
    }
    for (p, field) in probs.iter_mut().zip(fields) {
        *p = field.trim().parse().ok().filter(|p: &f64| p.is_finite())?;
    }
    Some(probs)
}

/// A document with its metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: String,

    /// 1-indexed relevance level.
    pub rlev: Option<u32>,

    pub year: i32,
    pub reference_probs: [f64; N_REFERENCE_PROBS],
    pub title: String,
    pub abstract_text: String,
}

impl Record {
    fn split(line: &str) -> Option<(Vec<&str>, Option<u32>)> {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields.len() {
            N_UNLABELED_FIELDS => Some((fields, None)),
            N_LABELED_FIELDS => {
                let rlev = parse_rlev(fields[1])?;
                let mut rest = Vec::with_capacity(N_UNLABELED_FIELDS);
                rest.push(fields[0]);
                rest.extend_from_slice(&fields[2..]);
                Some((rest, Some(rlev)))
            }
            _ => None,
        }
    }

    /// Parses a line in the canonical field order.
    ///
    /// Returns [`None`] if the line is malformed.
    pub fn from_canonical_line(line: &str) -> Option<Self> {
        let (fields, rlev) = Self::split(line)?;
        Some(Self {
            id: fields[0].trim().to_string(),
            rlev,
            year: parse_year(fields[1])?,
            reference_probs: parse_probs(&fields[2..6])?,
            title: fields[6].trim().to_string(),
            abstract_text: fields[7].trim().to_string(),
        })
    }

    /// Parses a line in the raw field order.
    ///
    /// Returns [`None`] if the line is malformed.
    pub fn from_raw_line(line: &str) -> Option<Self> {
        let (fields, rlev) = Self::split(line)?;
        Some(Self {
            id: fields[0].trim().to_string(),
            rlev,
            title: fields[1].trim().to_string(),
            abstract_text: fields[2].trim().to_string(),
            year: parse_year(fields[3])?,
            reference_probs: parse_probs(&fields[4..8])?,
        })
    }

    /// Parses a line in either field order, trying the canonical one first.
    pub fn from_line(line: &str) -> Option<Self> {
        Self::from_canonical_line(line).or_else(|| Self::from_raw_line(line))
    }

    /// Gets the 0-indexed class id.
    pub fn class_id(&self) -> Option<u32> {
        self.rlev.map(|rlev| rlev - 1)
    }

    /// Renders the record in the canonical field order.
    pub fn to_canonical_line(&self) -> String {
        let mut fields = Vec::with_capacity(N_LABELED_FIELDS);
        fields.push(self.id.clone());
        if let Some(rlev) = self.rlev {
            fields.push(rlev.to_string());
        }
        fields.push(self.year.to_string());
        fields.extend(self.reference_probs.iter().map(|p| p.to_string()));
        fields.push(self.title.clone());
        fields.push(self.abstract_text.clone());
        fields.join("\t")
    }
}

/// A labeled title and abstract pair.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledText {
    /// 1-indexed relevance level.
    pub rlev: u32,

    pub title: String,
    pub abstract_text: String,
}

impl LabeledText {
    /// Parses `rlev<TAB>title<TAB>abstract` or a labeled canonical record.
    ///
    /// Returns [`None`] if the line is malformed.
    pub fn from_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() == 3 {
            return Some(Self {
                rlev: parse_rlev(fields[0])?,
                title: fields[1].trim().to_string(),
                abstract_text: fields[2].trim().to_string(),
            });
        }
        Record::from_canonical_line(line).and_then(|r| Self::try_from(r).ok())
    }

    /// Gets the 0-indexed class id.
    pub fn class_id(&self) -> u32 {
        self.rlev - 1
    }
}

impl TryFrom<Record> for LabeledText {
    type Error = Record;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        match record.rlev {
            Some(rlev) => Ok(Self {
                rlev,
                title: record.title,
                abstract_text: record.abstract_text,
            }),
            None => Err(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical() {
        let r = Record::from_line("W1\t2\t2019\t0.1\t0.2\t0.3\t0.4\tA title\tAn abstract").unwrap();
        assert_eq!("W1", r.id);
        assert_eq!(Some(2), r.rlev);
        assert_eq!(Some(1), r.class_id());
        assert_eq!(2019, r.year);
        assert_eq!([0.1, 0.2, 0.3, 0.4], r.reference_probs);
        assert_eq!("A title", r.title);
    }

    #[test]
    fn test_raw() {
        let r = Record::from_line("W1\t A title \tAn abstract\t2019\t0.1\t0.2\t0.3\t0.4").unwrap();
        assert_eq!(None, r.rlev);
        assert_eq!("A title", r.title);
        assert_eq!(
            "W1\t2019\t0.1\t0.2\t0.3\t0.4\tA title\tAn abstract",
            r.to_canonical_line()
        );
    }

    #[test]
    fn test_malformed() {
        assert_eq!(None, Record::from_line("W1\t2019\t0.1"));
        assert_eq!(None, Record::from_line("W1\tt\ta\tyear\t0.1\t0.2\t0.3\t0.4"));
        assert_eq!(None, Record::from_line("W1\t0\t2019\t0.1\t0.2\t0.3\t0.4\tt\ta"));
        assert_eq!(None, Record::from_line("W1\t2019\tNaN\t0.2\t0.3\t0.4\tt\ta"));
    }

    #[test]
    fn test_rlev_range() {
        assert_eq!(Some(1), parse_rlev(" 1 "));
        assert_eq!(Some(MAX_RLEV), parse_rlev(&MAX_RLEV.to_string()));
        assert_eq!(None, parse_rlev(&(MAX_RLEV + 1).to_string()));
        assert_eq!(None, parse_rlev("4000000000"));
        assert_eq!(None, LabeledText::from_line("4000000000\tTitle\tAbstract"));
        assert_eq!(
            None,
            Record::from_line("W1\t4000000000\t2019\t0.1\t0.2\t0.3\t0.4\tt\ta")
        );
    }

    #[test]
    fn test_format_idempotent() {
        let lines = [
            "W1\t3\t  title one\tabstract one \t2020\t1e-1\t0.20\t0.30\t1",
            "W2\t2021\t0.5\t0.25\t0\t0.125\ttitle two\tabstract two",
        ];
        for line in lines {
            let once = Record::from_line(line).unwrap().to_canonical_line();
            let twice = Record::from_line(&once).unwrap().to_canonical_line();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_labeled_text() {
        let t = LabeledText::from_line("3\tTitle\tAbstract").unwrap();
        assert_eq!(2, t.class_id());
        let t = LabeledText::from_line("W1\t1\t2019\t0.1\t0.2\t0.3\t0.4\tT\tA").unwrap();
        assert_eq!(0, t.class_id());
        assert_eq!("T", t.title);
        assert_eq!(None, LabeledText::from_line("W1\t2019\t0.1\t0.2\t0.3\t0.4\tT\tA"));
        assert_eq!(None, LabeledText::from_line("x\tTitle\tAbstract"));
    }
}
