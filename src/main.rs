use car_control::config;
use car_control::logging;
use car_control::policy::PolicyKind;
use car_control::{
    ControlInput, EnvironmentParams, EpisodeStatus, RoadRam, SimError, SimulationBuilder,
    VehicleKind, VehicleParameters,
};
use clap::Parser;
use log::{LevelFilter, error, info, warn};
use std::process;

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about = "Headless road-driving simulation runner", long_about = None)]
struct Args {
    /// Number of episodes to run.
    #[arg(long, default_value_t = config::DEFAULT_EPISODES)]
    episodes: u32,

    /// Base seed; episode N uses seed + N for obstacles and the random policy.
    #[arg(long, default_value_t = config::DEFAULT_SEED)]
    seed: u64,

    /// Safety cap on ticks per episode.
    #[arg(long, default_value_t = config::MAX_TICKS)]
    max_ticks: u64,

    /// Control policy driving the vehicle.
    #[arg(long, value_enum, default_value_t = PolicyKind::Cruise)]
    policy: PolicyKind,

    /// Vehicle model.
    #[arg(long, value_enum, default_value_t = VehicleKind::Ackermann)]
    vehicle: VehicleKind,

    /// Maximum number of live obstacles.
    #[arg(long, default_value_t = config::MAX_OBJS)]
    max_objs: usize,

    /// Reward at which an episode counts as a success.
    #[arg(long, default_value_t = config::MAX_REWARD)]
    max_reward: f64,

    /// Tick length in seconds.
    #[arg(long, default_value_t = config::DT)]
    dt: f64,

    /// Debug filter to specify log topics (e.g., "vehicle,environment,episode")
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Default)]
struct Summary {
    goals: u32,
    collisions: u32,
    timeouts: u32,
    total_reward: f64,
}

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn run_episode(args: &Args, episode: u32, summary: &mut Summary) -> Result<(), SimError> {
    let seed = args.seed.wrapping_add(episode as u64);
    let vehicle_params = VehicleParameters {
        dt: args.dt,
        ..VehicleParameters::default()
    };
    let environment_params = EnvironmentParams {
        max_objs: args.max_objs,
        dt: args.dt,
        ..EnvironmentParams::default()
    };

    let mut sim = SimulationBuilder::new()
        .vehicle(args.vehicle.build(vehicle_params))
        .environment(Box::new(RoadRam::new(environment_params)?))
        .max_reward(args.max_reward)
        .seed(seed)
        .episode(episode)
        .build()?;
    let mut policy = args.policy.build(seed);
    info!(
        "Episode {} driving with {} policy (seed {})",
        episode,
        policy.name(),
        seed
    );

    while sim.tick() < args.max_ticks {
        let keys = policy.keys(&sim.vehicle_state(), sim.tick());
        let outcome = sim.step(ControlInput::from_keys(keys))?;
        if outcome.done {
            break;
        }
    }

    let snapshot = sim.render_state();
    let visible = sim.environment().in_bounds().len();

    match sim.status() {
        EpisodeStatus::DoneGoal => summary.goals += 1,
        EpisodeStatus::DoneCollision => summary.collisions += 1,
        EpisodeStatus::Running => {
            warn!(
                "Episode {} hit the tick cap at tick {}",
                episode,
                sim.tick()
            );
            summary.timeouts += 1;
        }
    }
    summary.total_reward += sim.reward();

    info!(
        "Episode {} result: {:?}, reward {:.2}, distance {:.1}, {} obstacle(s) live, {} visible",
        episode,
        sim.status(),
        sim.reward(),
        sim.distance_traveled(),
        snapshot.obstacles.len(),
        visible
    );
    Ok(())
}

fn main() {
    let args = Args::parse();

    // RUST_LOG selects env_logger and its filter syntax
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    } else if let Err(e) = logging::init_logger(parse_level(&args.log_level), args.debug_filter.clone()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    if let Some(filter) = &args.debug_filter {
        for topic in logging::parse_debug_filter(filter) {
            if !logging::TOPICS.contains(&topic.as_str()) {
                warn!("Unknown debug topic `{}` (known: {})", topic, logging::TOPICS.join(", "));
            }
        }
    }

    info!(
        "Running {} episode(s): vehicle={:?}, policy={:?}, max_objs={}, dt={}",
        args.episodes, args.vehicle, args.policy, args.max_objs, args.dt
    );

    let mut summary = Summary::default();
    for episode in 1..=args.episodes {
        if let Err(e) = run_episode(&args, episode, &mut summary) {
            error!("Episode {} failed: {}", episode, e);
            process::exit(1);
        }
    }

    let mean_reward = if args.episodes > 0 {
        summary.total_reward / args.episodes as f64
    } else {
        0.0
    };
    info!(
        "Finished: {} goal(s), {} collision(s), {} timeout(s), mean reward {:.2}",
        summary.goals, summary.collisions, summary.timeouts, mean_reward
    );
}
