use crate::assigner::{GreedyAssigner, Placement};
use crate::data::{GenerateOptions, GenerationResult, SchoolConfig, SearchStats};
use crate::diagnostics::compute_diagnostics;
use crate::index::DomainIndex;
use crate::optimizer::LocalSearch;
use crate::requirements;
use crate::rng::Lcg;
use log::info;
use rand::RngCore;
use std::time::Instant;

/// Generates a timetable: greedy construction, then seeded local search.
///
/// Infeasible demand never fails the call; it shows up as unassigned
/// markers counted in the diagnostics.
pub fn generate(config: &SchoolConfig, options: &GenerateOptions) -> GenerationResult {
    generate_with_rng(config, options, Lcg::new(options.seed))
}

/// Like [`generate`], drawing swap candidates from `rng` instead of the
/// seeded [`Lcg`].
pub fn generate_with_rng<R: RngCore>(
    config: &SchoolConfig,
    options: &GenerateOptions,
    rng: R,
) -> GenerationResult {
    let start_time = Instant::now();
    let index = DomainIndex::build(config);
    let requirements = requirements::flatten(config, &index);
    info!(
        "Generating timetable for {} classes from {} requirements over {} days of {} periods...",
        config.classes.len(),
        requirements.len(),
        config.working_days,
        config.periods_per_day
    );

    let mut stats = SearchStats {
        requirements: requirements.len(),
        ..SearchStats::default()
    };
    let mut assigner = GreedyAssigner::new(config, &index);
    for requirement in &requirements {
        match assigner.assign(requirement) {
            Placement::Assigned(_) => stats.greedy_assigned += 1,
            Placement::Unassigned(_) => stats.greedy_unassigned += 1,
            Placement::Dropped => stats.dropped_requirements += 1,
        }
    }
    let mut state = assigner.into_state();
    let greedy_elapsed = start_time.elapsed();
    stats.greedy_ms = greedy_elapsed.as_millis() as u64;
    info!(
        "Greedy pass placed {} of {} requirements in {:.2?}.",
        stats.greedy_assigned,
        stats.requirements,
        greedy_elapsed
    );

    let optimize_start = Instant::now();
    let mut search = LocalSearch::new(config, &index, options.weights, rng);
    let outcome = search.run(&mut state, options.optimize_iterations);
    stats.iterations = outcome.iterations;
    stats.same_slot_draws = outcome.same_slot_draws;
    stats.infeasible_swaps = outcome.infeasible;
    stats.accepted_swaps = outcome.accepted;
    stats.initial_penalty = outcome.initial_penalty;
    stats.optimize_ms = optimize_start.elapsed().as_millis() as u64;

    let timetable = state.into_timetable();
    let diagnostics = compute_diagnostics(&timetable, config, &options.weights);
    stats.final_penalty = diagnostics.penalty_score;
    info!(
        "Timetable ready: penalty {} -> {}, {} unassigned, {} swaps accepted, total {:.2?}.",
        stats.initial_penalty,
        stats.final_penalty,
        diagnostics.unassigned_count,
        stats.accepted_swaps,
        start_time.elapsed()
    );

    GenerationResult {
        timetable,
        diagnostics,
        stats,
    }
}
