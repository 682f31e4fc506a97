//! Headless Skirmish Runner
//!
//! Runs a scripted squad-vs-aliens skirmish and outputs a JSON summary for
//! balance sweeps. Same seed, same story: rerun with --seed to replay an
//! identical battle.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use vantage::core::config::EncounterConfig;
use vantage::core::error::{Result, VantageError};
use vantage::core::types::{Faction, UnitId};
use vantage::equipment::{AmmoProfile, ArmorProfile, WeaponProfile};
use vantage::tactical::{
    AbilityKind, AbilityProfile, Capability, CombatEventType, CoverKind, CoverState,
    EncounterState, GridPosition, Unit, UnitKind,
};

/// Headless Skirmish Runner - scripted encounters for balance sweeps
#[derive(Parser, Debug)]
#[command(name = "skirmish_runner")]
#[command(about = "Run a scripted squad-vs-aliens skirmish and output a summary")]
struct Args {
    /// Tuning profile name (loaded from data/tuning/)
    #[arg(long, default_value = "default")]
    tuning: String,

    /// Squad size (roster caps at 5)
    #[arg(long, default_value_t = 4)]
    soldiers: usize,

    /// Alien pod size (roster caps at 5)
    #[arg(long, default_value_t = 4)]
    aliens: usize,

    /// Maximum turns before the skirmish is called a stalemate
    #[arg(long, default_value_t = 20)]
    max_turns: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Write the full event log as JSON to this path
    #[arg(long)]
    events_out: Option<PathBuf>,

    /// Enable verbose turn-by-turn logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct SkirmishSummary {
    outcome: String,
    turns: u32,
    seed: u64,
    tuning: String,
    shots: usize,
    hits: usize,
    crits: usize,
    overwatch_shots: usize,
    grenades: usize,
    covers_destroyed: usize,
    effects_applied: usize,
    dot_deaths: usize,
    units: Vec<UnitRow>,
}

#[derive(Serialize)]
struct UnitRow {
    name: String,
    faction: String,
    alive: bool,
    health: i32,
    max_health: i32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs to stderr so the summary JSON on stdout stays parseable
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    let config = EncounterConfig::load(&args.tuning).map_err(VantageError::InvalidConfig)?;
    let mut state = EncounterState::new(config, seed);

    let squad = deploy_squad(&mut state, args.soldiers.min(5));
    let pod = deploy_pod(&mut state, args.aliens.min(5));
    place_cover(&mut state);

    if squad.len() >= 2 {
        state.bond_units(squad[0], squad[1]);
    }

    if args.verbose {
        eprintln!("=== Skirmish started (seed {}) ===", seed);
        for event in &state.events().events {
            eprintln!("  [{}] {:?}: {}", event.turn, event.event_type, event.description);
        }
        eprintln!();
    }

    // Run the skirmish
    let mut dot_deaths = 0;
    let outcome = loop {
        if args.verbose {
            eprintln!("=== Turn {} ===", state.turn());
            for unit in state.units() {
                eprintln!(
                    "  {} [{:?}] at ({},{}) hp {}/{} ap {:.1}",
                    unit.name,
                    unit.faction,
                    unit.position.x,
                    unit.position.y,
                    unit.health,
                    unit.max_health,
                    unit.action_points
                );
            }
        }

        let events_before = state.events().len();

        if state.turn() == 1 {
            // Only stealth-trained units accept this; the rest refuse silently
            for id in &squad {
                state.conceal(*id);
            }
        }

        for id in &squad {
            act_unit(&mut state, *id, &squad, &pod, true);
        }
        for id in &pod {
            act_unit(&mut state, *id, &pod, &squad, false);
        }

        let squad_alive = living(&state, &squad);
        let pod_alive = living(&state, &pod);
        let finished = squad_alive == 0 || pod_alive == 0 || state.turn() >= args.max_turns;

        if !finished {
            let report = state.advance_turn();
            dot_deaths += report.dot_deaths.len();
        }

        if args.verbose {
            for event in state.events().events.iter().skip(events_before) {
                eprintln!("  [{}] {:?}: {}", event.turn, event.event_type, event.description);
            }
            eprintln!();
        }

        if finished {
            break match (squad_alive, pod_alive) {
                (0, 0) => "MutualDestruction",
                (_, 0) => "SquadVictory",
                (0, _) => "AlienVictory",
                _ => "Stalemate",
            };
        }
    };

    // Tally the event log
    let mut summary = SkirmishSummary {
        outcome: outcome.to_string(),
        turns: state.turn(),
        seed,
        tuning: args.tuning.clone(),
        shots: 0,
        hits: 0,
        crits: 0,
        overwatch_shots: 0,
        grenades: 0,
        covers_destroyed: 0,
        effects_applied: 0,
        dot_deaths,
        units: Vec::new(),
    };
    for event in &state.events().events {
        match &event.event_type {
            CombatEventType::AttackResolved { hit, critical, .. } => {
                summary.shots += 1;
                if *hit {
                    summary.hits += 1;
                }
                if *critical {
                    summary.crits += 1;
                }
            }
            CombatEventType::OverwatchTriggered { .. } => summary.overwatch_shots += 1,
            CombatEventType::AreaAttackResolved { .. } => summary.grenades += 1,
            CombatEventType::CoverDestroyed { .. } => summary.covers_destroyed += 1,
            CombatEventType::EffectApplied { .. } => summary.effects_applied += 1,
            _ => {}
        }
    }
    for id in squad.iter().chain(pod.iter()) {
        let unit = state.unit(*id).ok_or(VantageError::UnitNotFound(*id))?;
        summary.units.push(UnitRow {
            name: unit.name.clone(),
            faction: format!("{:?}", unit.faction),
            alive: unit.alive,
            health: unit.health,
            max_health: unit.max_health,
        });
    }

    if let Some(path) = &args.events_out {
        let json = serde_json::to_string_pretty(state.events())?;
        std::fs::write(path, json)?;
        tracing::info!("Wrote {} events to {:?}", state.events().len(), path);
    }

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "text" => {
            println!("Skirmish Result");
            println!("===============");
            println!("Outcome: {}", summary.outcome);
            println!("Turns: {}", summary.turns);
            println!(
                "Shots: {} ({} hits, {} crits)",
                summary.shots, summary.hits, summary.crits
            );
            println!("Overwatch shots: {}", summary.overwatch_shots);
            println!("Grenades: {}", summary.grenades);
            println!("Covers destroyed: {}", summary.covers_destroyed);
            println!("Effects applied: {}", summary.effects_applied);
            println!("Deaths to burn/poison ticks: {}", summary.dot_deaths);
            println!();
            for row in &summary.units {
                let status = if row.alive {
                    format!("{}/{} hp", row.health, row.max_health)
                } else {
                    "KIA".to_string()
                };
                println!("  {} [{}]: {}", row.name, row.faction, status);
            }
            println!();
            println!("Seed: {}", summary.seed);
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// Deploy the player squad along the south edge
fn deploy_squad(state: &mut EncounterState, count: usize) -> Vec<UnitId> {
    let mut ids = Vec::new();

    // Rifleman carries the squad medikit
    let rifleman = Unit::soldier("Ramirez", Faction::Player, GridPosition::new(2, 0));
    ids.push(state.spawn_unit(rifleman));

    if count >= 2 {
        // Scout: sidearm and concealment training
        let mut scout = Unit::soldier("Chen", Faction::Player, GridPosition::new(4, 0))
            .with_capability(Capability::Stealth);
        scout.weapon = WeaponProfile::pistol();
        ids.push(state.spawn_unit(scout));
    }
    if count >= 3 {
        // Grenadier: launcher loaded with incendiary shells
        let mut grenadier = Unit::soldier("Okafor", Faction::Player, GridPosition::new(6, 0));
        grenadier.weapon = WeaponProfile::grenade_launcher();
        grenadier.ammo = AmmoProfile::incendiary();
        ids.push(state.spawn_unit(grenadier));
    }
    if count >= 4 {
        // Marksman starts one level up; height 1 grants nothing yet
        let mut marksman =
            Unit::soldier("Dubois", Faction::Player, GridPosition::at_height(0, 1, 1));
        marksman.weapon = WeaponProfile::sniper_rifle();
        ids.push(state.spawn_unit(marksman));
    }
    if count >= 5 {
        let mut breacher = Unit::soldier("Suarez", Faction::Player, GridPosition::new(8, 1));
        breacher.weapon = WeaponProfile::shotgun();
        breacher.ammo = AmmoProfile::armor_piercing();
        ids.push(state.spawn_unit(breacher));
    }
    ids
}

/// Deploy the alien pod along the north edge
fn deploy_pod(state: &mut EncounterState, count: usize) -> Vec<UnitId> {
    let mut ids = Vec::new();

    ids.push(state.spawn_unit(Unit::alien(
        "Sectoid Alpha",
        Faction::Enemy,
        GridPosition::new(3, 10),
    )));
    if count >= 2 {
        ids.push(state.spawn_unit(Unit::alien(
            "Sectoid Beta",
            Faction::Enemy,
            GridPosition::new(5, 10),
        )));
    }
    if count >= 3 {
        // Viper spits toxin
        let mut viper = Unit::alien("Viper", Faction::Enemy, GridPosition::new(7, 11));
        viper.ammo = AmmoProfile::toxic();
        ids.push(state.spawn_unit(viper));
    }
    if count >= 4 {
        let mut bruiser = Unit::alien("Muton Bruiser", Faction::Enemy, GridPosition::new(1, 11));
        bruiser.ammo = AmmoProfile::concussive();
        ids.push(state.spawn_unit(bruiser));
    }
    if count >= 5 {
        // Pod leader uses the ruler stat row
        let mut tyrant = Unit::new(
            "Hive Tyrant",
            UnitKind::Ruler,
            Faction::Enemy,
            GridPosition::new(5, 12),
        );
        tyrant.weapon = WeaponProfile::plasma_rifle();
        tyrant.armor = ArmorProfile::alien_carapace();
        ids.push(state.spawn_unit(tyrant));
    }
    ids
}

/// Scatter cover between the deployment lines
fn place_cover(state: &mut EncounterState) {
    state.add_cover(CoverState::new(GridPosition::new(3, 4), CoverKind::Heavy, 100));
    state.add_cover(CoverState::new(GridPosition::new(6, 4), CoverKind::Light, 60));
    state.add_cover(CoverState::new(
        GridPosition::new(2, 6),
        CoverKind::HalfCover,
        60,
    ));
    state.add_cover(CoverState::new(
        GridPosition::new(7, 7),
        CoverKind::DeepCover,
        120,
    ));
}

/// One unit's scripted activation: cure, grenade, shoot, advance, or settle
///
/// Loops until the unit runs dry; every accepted action spends points, so
/// the loop always terminates.
fn act_unit(
    state: &mut EncounterState,
    actor: UnitId,
    friends: &[UnitId],
    foes: &[UnitId],
    medic: bool,
) {
    loop {
        let (position, weapon) = match state.unit(actor) {
            Some(unit) if unit.can_act() => (unit.position.clone(), unit.weapon.clone()),
            _ => return,
        };

        if medic && try_cure(state, actor, friends) {
            continue;
        }

        let target = match nearest_living(state, &position, foes) {
            Some(id) => id,
            None => return,
        };
        let target_pos = match state.unit(target) {
            Some(unit) => unit.position.clone(),
            None => return,
        };

        // Grenade when the enemy bunches up and no friend is in the blast
        if weapon.is_area() && position.within_range(&target_pos, weapon.range) {
            let clustered = count_within(state, foes, &target_pos, weapon.area_radius);
            let splash = count_within(state, friends, &target_pos, weapon.area_radius);
            if clustered >= 2 && splash == 0 {
                let result = state.resolve_area_attack(actor, target_pos.clone());
                if result.accepted {
                    continue;
                }
            }
        }

        if position.within_range(&target_pos, weapon.range)
            && position.has_line_of_sight(&target_pos)
        {
            let result = state.resolve_attack(actor, target);
            if result.accepted {
                continue;
            }
        }

        // Close the distance one tile at a time
        let step = step_toward(&position, &target_pos);
        let moved = state.try_move(actor, step);
        if !moved.accepted {
            // Pool too thin to move: settle in and watch the lane
            if !state.set_overwatch(actor) {
                state.hunker(actor);
            }
            return;
        }
    }
}

/// Medikit a squadmate in reach when the kit is ready and someone needs it
fn try_cure(state: &mut EncounterState, actor: UnitId, friends: &[UnitId]) -> bool {
    let profile = AbilityProfile::of(AbilityKind::Medikit);
    let ready = state.unit(actor).map_or(false, |unit| {
        unit.cooldown_remaining(AbilityKind::Medikit) == 0
            && unit.action_points >= profile.action_cost
    });
    if !ready {
        return false;
    }
    let position = match state.unit(actor) {
        Some(unit) => unit.position.clone(),
        None => return false,
    };
    let patient = friends.iter().copied().find(|id| {
        state.unit(*id).map_or(false, |unit| {
            unit.is_alive()
                && position.within_range(&unit.position, profile.range)
                && profile.cures.iter().any(|kind| unit.effects.has(*kind))
        })
    });
    match patient {
        Some(id) => state.use_cure_ability(actor, id, AbilityKind::Medikit).accepted,
        None => false,
    }
}

fn nearest_living(state: &EncounterState, from: &GridPosition, ids: &[UnitId]) -> Option<UnitId> {
    ids.iter()
        .filter_map(|id| state.unit(*id))
        .filter(|unit| unit.is_alive())
        .min_by_key(|unit| from.distance2d(&unit.position))
        .map(|unit| unit.id)
}

fn count_within(
    state: &EncounterState,
    ids: &[UnitId],
    center: &GridPosition,
    radius: i32,
) -> usize {
    ids.iter()
        .filter_map(|id| state.unit(*id))
        .filter(|unit| unit.is_alive() && unit.position.within_range(center, radius))
        .count()
}

fn living(state: &EncounterState, ids: &[UnitId]) -> usize {
    ids.iter()
        .filter_map(|id| state.unit(*id))
        .filter(|unit| unit.is_alive())
        .count()
}

/// One tile toward the target, diagonals allowed; approach lanes are flat
fn step_toward(from: &GridPosition, to: &GridPosition) -> GridPosition {
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    GridPosition::new(from.x + dx, from.y + dy)
}
