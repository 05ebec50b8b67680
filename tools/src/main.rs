//! promo-runner: headless runner for the promotion ROI engine.
//!
//! Usage:
//!   promo-runner --data-dir ./data --value-tier High --freq-tier Frequent \
//!                --promotion "$50 Free Play" --campaign-size 1000 [--response-rate 0.4]
//!   promo-runner --data-dir ./data --ipc-mode
//!   promo-runner --generate 5000 --seed 42 --out ./data

use anyhow::Result;
use promoplay_core::{
    engine::PromoEngine,
    roi::{CampaignRequest, ProjectionOutcome},
    sample::{self, SampleSpec},
    segmentation::ValueBinning,
    summary::SegmentCell,
    types::{FreqTier, ValueTier},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Evaluate(CampaignRequest),
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    snapshot_id: String,
    loaded_at: String,
    records: usize,
    dropped_by_join: i64,
    coerced_cells: usize,
    binning: Option<ValueBinning>,
    promotions: Vec<String>,
    segments: Vec<SegmentCell>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = parse_str(&args, "--data-dir").unwrap_or("./data");

    if let Some(n) = parse_str(&args, "--generate") {
        let patrons: usize = n.parse()?;
        let seed = parse_arg(&args, "--seed", 42u64);
        let out = parse_str(&args, "--out").unwrap_or(data_dir);
        let raw = sample::generate(seed, &SampleSpec::new(patrons));
        sample::write_csv(&raw, out)?;
        println!("wrote {} trip rows, {} patron rows to {out}", raw.trips.len(), raw.patrons.len());
        return Ok(());
    }

    let mut engine = PromoEngine::build(data_dir)?;
    engine.load_data_dir(data_dir)?;

    if args.iter().any(|a| a == "--ipc-mode") {
        return run_ipc_loop(&engine);
    }

    let value_tier: ValueTier = parse_str(&args, "--value-tier")
        .unwrap_or("High")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let freq_tier: FreqTier = parse_str(&args, "--freq-tier")
        .unwrap_or("Frequent")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let promotion = match parse_str(&args, "--promotion") {
        Some(p) => p.to_string(),
        None => engine
            .promotion_names()
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("promotion catalog is empty"))?,
    };
    if !engine.tables.contains(&promotion) {
        anyhow::bail!(
            "unknown promotion '{promotion}'; catalog: {}",
            engine.promotion_names().join(", ")
        );
    }
    let campaign_size: u64 = parse_str(&args, "--campaign-size")
        .map(str::parse)
        .transpose()?
        .unwrap_or(1000);

    let mut request = CampaignRequest::new(value_tier, freq_tier, promotion, campaign_size);
    if let Some(rate) = parse_str(&args, "--response-rate") {
        request = request.with_response_rate(rate.parse()?);
    }

    print_summary(&engine)?;
    print_projection(&request, &engine.evaluate(&request)?);
    Ok(())
}

fn run_ipc_loop(engine: &PromoEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                let state = build_ui_state(engine)?;
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            IpcCommand::Evaluate(request) => {
                // Bad selections are reported to the front end, not fatal.
                let reply = match engine.evaluate(&request) {
                    Ok(outcome) => serde_json::to_value(outcome)?,
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                };
                writeln!(stdout, "{}", reply)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &PromoEngine) -> Result<UiState> {
    let snapshot = engine
        .snapshot()
        .ok_or_else(|| anyhow::anyhow!("no dataset loaded"))?;

    Ok(UiState {
        snapshot_id: snapshot.snapshot_id.clone(),
        loaded_at: snapshot.loaded_at.to_rfc3339(),
        records: snapshot.records.len(),
        dropped_by_join: snapshot.dropped_by_join,
        coerced_cells: snapshot.coerced_cells,
        binning: engine.binning(),
        promotions: engine.promotion_names().to_vec(),
        segments: engine.segment_summary()?,
    })
}

fn print_summary(engine: &PromoEngine) -> Result<()> {
    let snapshot = engine
        .snapshot()
        .ok_or_else(|| anyhow::anyhow!("no dataset loaded"))?;

    println!("=== DATASET ===");
    println!("  snapshot:        {}", snapshot.snapshot_id);
    println!("  trip rows:       {}", snapshot.trip_rows);
    println!("  patron rows:     {}", snapshot.patron_rows);
    println!("  merged records:  {}", snapshot.records.len());
    println!("  dropped by join: {}", snapshot.dropped_by_join);
    println!("  coerced cells:   {}", snapshot.coerced_cells);
    match engine.binning() {
        Some(ValueBinning::Quantile { low_cut, mid_cut }) => {
            println!("  value bins:      quantile (p20={low_cut:.2}, p60={mid_cut:.2})")
        }
        Some(ValueBinning::Fixed { median, p80, .. }) => {
            println!("  value bins:      fixed fallback (median={median:.2}, p80={p80:.2})")
        }
        None => println!("  value bins:      (no records)"),
    }

    println!();
    println!("=== SEGMENTS ===");
    for cell in engine.segment_summary()? {
        println!(
            "  {:<5} {:<11} | patrons: {:>6} | avg coin-in: ${:>12.2} | avg trips: {:>5.1}",
            cell.value_tier.label(),
            cell.freq_tier.label(),
            cell.patrons,
            cell.avg_coin_in,
            cell.avg_trips
        );
    }
    Ok(())
}

fn print_projection(request: &CampaignRequest, outcome: &ProjectionOutcome) {
    println!();
    println!(
        "=== PROJECTION: {} / {} / {} x{} ===",
        request.value_tier, request.freq_tier, request.promotion, request.campaign_size
    );
    match outcome {
        ProjectionOutcome::Projected(p) => {
            println!("  response rate:       {:.1}%", p.response_rate * 100.0);
            println!("  avg LTV:             ${:.2}", p.average_ltv);
            println!("  expected responders: {:.0}", p.expected_responders);
            println!("  incremental revenue: ${:.2}", p.incremental_revenue);
            println!("  total promo cost:    ${:.2}", p.total_promo_cost);
            println!("  ROI:                 {:.1}%", p.roi * 100.0);
        }
        ProjectionOutcome::NoResponseAssumption => {
            println!("  No valid projection: no response-rate assumption for this segment");
            println!("  and promotion. Supply --response-rate to override.");
        }
    }
}

fn parse_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    parse_str(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
