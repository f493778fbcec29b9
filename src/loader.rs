//! Bootstrap loading of the input tables
//!
//! Up to three tables are read as independent concurrent loads joined
//! before ingest begins. A failed or absent table never blocks the other
//! two; it simply ends up `None` and downstream code falls back to
//! deriving the corresponding aggregate from the primary dataset.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, warn};

use crate::csv_io::{self, TableError};
use crate::ngram::ExternalTermRow;
use crate::record::RawRecord;
use crate::winrate::ExternalWinRateRow;

/// The three bootstrap tables; each is independently optional.
#[derive(Debug, Default)]
pub struct Tables {
    pub usage: Option<Vec<RawRecord>>,
    pub winrate: Option<Vec<ExternalWinRateRow>>,
    pub ngrams: Option<Vec<ExternalTermRow>>,
}

fn load_one<T>(
    label: &str,
    path: Option<&Path>,
    parse: impl Fn(BufReader<File>) -> Result<Vec<T>, TableError>,
) -> Option<Vec<T>> {
    let path = path?;
    match File::open(path).map_err(TableError::from).and_then(|f| parse(BufReader::new(f))) {
        Ok(rows) => {
            debug!(table = label, rows = rows.len(), "table loaded");
            Some(rows)
        }
        Err(err) => {
            warn!(table = label, %err, "table unavailable, continuing without it");
            None
        }
    }
}

/// Load whichever tables were named. Loads run on scoped threads and are
/// joined here; per-table failures degrade to `None`.
pub fn load_tables(
    usage: Option<&Path>,
    winrate: Option<&Path>,
    ngrams: Option<&Path>,
) -> Tables {
    std::thread::scope(|scope| {
        let usage = scope.spawn(move || load_one("usage", usage, csv_io::read_usage));
        let winrate = scope.spawn(move || load_one("winrate", winrate, csv_io::read_winrate));
        let ngrams = scope.spawn(move || load_one("ngrams", ngrams, csv_io::read_ngrams));
        Tables {
            usage: usage.join().unwrap_or_default(),
            winrate: winrate.join().unwrap_or_default(),
            ngrams: ngrams.join().unwrap_or_default(),
        }
    })
}
