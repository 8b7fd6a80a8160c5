//! Command implementations.

use std::path::Path;

use kprof::{
    GlobalTimer, ProfilingParams, TraceSummary, TraceView, gen_profiler_header, load_words,
    save_words, simulate,
};
use tracing::{error, info};

use crate::cli::{Cli, Commands, EXIT_FAILURE, EXIT_SUCCESS, ProfilerArgs, simulate_config};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    let result = match &cli.command {
        Commands::Header { profiler, output } => cmd_header(profiler, output.as_deref()),
        Commands::Params { profiler } => {
            cmd_params(profiler);
            Ok(())
        }
        Commands::Simulate {
            groups,
            lanes,
            regions,
            max_events,
            work,
            instant,
            output,
        } => cmd_simulate(
            *groups,
            *lanes,
            *regions,
            *max_events,
            *work,
            *instant,
            output.as_deref(),
        ),
        Commands::Dump { input, group } => cmd_dump(input, *group),
    };

    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            error!("{err}");
            EXIT_FAILURE
        }
    }
}

fn cmd_header(profiler: &ProfilerArgs, output: Option<&Path>) -> kprof::Result<()> {
    let header = gen_profiler_header(&profiler.to_config());
    match output {
        Some(path) => {
            std::fs::write(path, &header)?;
            info!(path = %path.display(), "wrote profiler header");
        }
        None => print!("{header}"),
    }
    Ok(())
}

fn cmd_params(profiler: &ProfilerArgs) {
    let params = ProfilingParams::new(&profiler.to_config());
    println!("param_decl:   {:?}", params.param_decl);
    println!("arg_forward:  {:?}", params.arg_forward);
    println!("setter:       {:?}", params.setter);
    println!("params_decl:  {:?}", params.params_decl);
    println!("closure_decl: {:?}", params.closure_decl);
}

fn cmd_simulate(
    groups: u32,
    lanes: u32,
    regions: u32,
    max_events: usize,
    work: u32,
    instant: bool,
    output: Option<&Path>,
) -> kprof::Result<()> {
    // Start the time base before the launch so no record reads timestamp 0.
    let _ = GlobalTimer::epoch();
    let config = simulate_config(groups, lanes, regions, max_events, work, instant);
    let buffer = simulate(&config, &GlobalTimer)?;
    let words = buffer.snapshot();

    if let Some(path) = output {
        save_words(path, &words)?;
        info!(path = %path.display(), words = words.len(), "wrote trace buffer");
    }

    // The no-op writer does not even write the header, so there is nothing to
    // decode.
    if !kprof::PROFILER_ENABLED {
        info!("built without the profiler feature; the buffer is empty");
        return Ok(());
    }
    let timelines = TraceView::parse(&words)?.timelines()?;
    print_summary(&TraceSummary::from_timelines(&timelines));
    Ok(())
}

fn cmd_dump(input: &Path, group: Option<u32>) -> kprof::Result<()> {
    let words = load_words(input)?;
    let view = TraceView::parse(&words)?;
    let header = view.header();
    println!(
        "groups: {}  words: {}  header.reserved: {:#010x}",
        header.group_count,
        words.len(),
        header.reserved
    );

    let groups: Vec<u32> = match group {
        Some(g) => vec![g],
        None => (0..view.group_count()).collect(),
    };
    for g in groups {
        let events = view.events(g)?;
        println!("group {g}: {} events", events.len());
        for event in events {
            println!(
                "  {:>10}  {:<7}  slot {}",
                event.timestamp, event.event_type, event.event_slot
            );
        }
    }
    Ok(())
}

fn print_summary(summary: &TraceSummary) {
    println!(
        "groups: {}  events: {}  instants: {}  unmatched: {}",
        summary.groups, summary.events, summary.instants, summary.unmatched
    );
    for region in &summary.regions {
        println!(
            "  slot {:>4}  count {:>6}  min {:>10} ns  mean {:>10} ns  max {:>10} ns",
            region.event_slot,
            region.count,
            region.min_ns,
            region.mean_ns(),
            region.max_ns
        );
    }
}
