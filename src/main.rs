use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use usagelens::{
    aggregate, cli::Cli, csv_io, filter, filter::FilterCriteria, loader, ngram,
    ngram::NgramCounter, normalize::Normalizer, report, store::DatasetStore, winrate,
};

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = args.analysis_config();
    let normalizer = Normalizer::new(config.use_heuristics)?;
    let counter = NgramCounter::new()?;

    // Bootstrap: up to three tables, loaded independently.
    let tables = loader::load_tables(
        Some(args.data.as_path()),
        args.winrate.as_deref(),
        args.ngrams.as_deref(),
    );

    let mut store = DatasetStore::new();
    if let Some(rows) = tables.usage {
        store.ingest(rows, &normalizer);
    }
    if store.is_empty() {
        println!("No valid usage records loaded.");
        return Ok(());
    }
    info!(records = store.len(), "dataset ingested");
    if let Some((lo, hi)) = store.date_bounds() {
        println!(
            "Dataset: {} records, {} - {} ({} models, {} topics)\n",
            store.len(),
            lo.format("%Y-%m-%d"),
            hi.format("%Y-%m-%d"),
            store.models().len(),
            store.topics().len()
        );
    }

    let criteria = FilterCriteria {
        date_start: args.date_start,
        date_end: args.date_end,
        models: args.models.iter().cloned().collect(),
        topics: args.topics.iter().cloned().collect(),
    };
    let view = filter::apply_filters(&mut store, &normalizer, &criteria);

    let kpi = aggregate::kpi(&view, config.fit_scale);
    let trend = aggregate::trend(&view);
    let dist = aggregate::tts_distribution(&view);
    let heatmap = aggregate::heatmap(&view, config.fit_scale);

    // Precomputed tables win over derivation from the filtered view; a
    // table with no usable rows counts as absent.
    let wr_entries = match tables.winrate.as_deref() {
        Some(rows)
            if rows
                .iter()
                .any(|r| r.model.as_deref().is_some_and(|m| !m.trim().is_empty())) =>
        {
            winrate::from_external(rows, config.min_n_winrate)
        }
        _ => winrate::from_records(&view, config.min_n_winrate),
    };
    let verdict = winrate::verdict(&wr_entries);

    let terms = match tables.ngrams {
        Some(rows) if !rows.is_empty() => ngram::from_external(&rows),
        _ => counter.count(&view),
    };

    report::print_kpis(&kpi, &config);
    report::print_trend(&trend);
    report::print_distribution(dist.as_ref());
    report::print_heatmap(&heatmap);
    report::print_winrate(&wr_entries, verdict.as_ref(), &config);
    report::print_ngrams(&terms);

    if let Some(path) = args.export {
        if view.is_empty() {
            warn!("filtered view is empty, skipping export");
        } else {
            csv_io::write_records(&path, &view)?;
            info!(path = %path.display(), rows = view.len(), "filtered records exported");
        }
    }

    Ok(())
}
