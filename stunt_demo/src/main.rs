//! Headless stunt demo
//!
//! Spawns a trick-performing player and a handful of bots that chase it and
//! throw projectiles, then runs the engine for a fixed number of frames.
//!
//! Usage: `stunt_demo [config.toml|config.ron] [frames]`

mod behaviors;
mod surface;

use std::cell::{Cell, RefCell};
use std::num::ParseIntError;
use std::rc::Rc;

use stunt_engine::foundation::logging::{self, LevelFilter};
use stunt_engine::prelude::*;
use stunt_engine::render::swapchain::vk;
use stunt_engine::render::{SurfaceSupport, SwapchainError, SwapchainPlan};
use thiserror::Error;

use behaviors::{BotBehavior, PlayerBehavior, ProjectileBehavior, TrickStats};
use surface::HeadlessSurface;

const BOT_COUNT: usize = 4;
const FIRE_INTERVAL: u32 = 15;
const FIRE_RANGE: f32 = 12.0;
const HIT_RADIUS: f32 = 1.5;
const GRIND_RADIUS: f32 = 1.0;
const PROJECTILE_DAMAGE: i32 = 8;
const PROJECTILE_LIFETIME: u32 = 40;
const DEFAULT_FRAMES: u64 = 300;

/// Errors that end the demo before or during the run
#[derive(Error, Debug)]
enum DemoError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid frame count '{value}': {source}")]
    FrameCount { value: String, source: ParseIntError },

    #[error("Swapchain error: {0}")]
    Swapchain(#[from] SwapchainError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

struct Projectile {
    handle: EntityHandle,
    owner: EntityHandle,
}

struct StuntDemo {
    player: Option<EntityHandle>,
    bots: Vec<EntityHandle>,
    projectiles: Vec<Projectile>,
    player_position: Rc<Cell<Vec3>>,
    stats: Rc<RefCell<TrickStats>>,
    frame: u32,
    player_gone: bool,
}

impl StuntDemo {
    fn new() -> Self {
        Self {
            player: None,
            bots: Vec::new(),
            projectiles: Vec::new(),
            player_position: Rc::new(Cell::new(Vec3::zeros())),
            stats: Rc::default(),
            frame: 0,
            player_gone: false,
        }
    }

    fn spawn_projectile(
        entities: &mut EntitySystem,
        owner: EntityHandle,
        target: Vec3,
    ) -> Result<Option<EntityHandle>, AppError> {
        let origin = entities.get(owner)?.position;
        let aim = target - origin;
        if aim.magnitude() < f32::EPSILON {
            return Ok(None);
        }
        let handle = match entities.new_entity() {
            Ok(handle) => handle,
            Err(e) if e.is_recoverable() => {
                log::warn!("Bot {owner} could not fire: {e}");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let projectile = entities.get_mut(handle)?;
        projectile.entity_type = EntityType::Weapon;
        projectile.position = origin;
        projectile.velocity = aim.normalize() * 0.6;
        projectile.power_ability = PROJECTILE_DAMAGE;
        entities.set_behavior(handle, Box::new(ProjectileBehavior::new(PROJECTILE_LIFETIME)))?;
        Ok(Some(handle))
    }

    fn resolve_contacts(
        &mut self,
        entities: &mut EntitySystem,
        player: EntityHandle,
    ) -> Result<(), AppError> {
        let player_position = entities.get(player)?.position;

        for projectile in &self.projectiles {
            let Ok(entity) = entities.get(projectile.handle) else {
                continue;
            };
            if (entity.position - player_position).magnitude() > HIT_RADIUS {
                continue;
            }
            let damage = entities.touch(projectile.handle, player)?;
            if damage > 0 {
                let health = entities.entity_damage(
                    Some(player),
                    Some(projectile.handle),
                    Some(projectile.owner),
                    damage,
                )?;
                log::info!(
                    "Player hit by bot {} for {damage}, health now {health}",
                    projectile.owner
                );
            }
        }

        for &bot in &self.bots {
            let Ok(entity) = entities.get(bot) else {
                continue;
            };
            let in_reach = (entity.position - player_position).magnitude() < GRIND_RADIUS;
            if entity.state.is_active() && in_reach {
                entities.entity_damage(Some(bot), Some(player), Some(player), 10)?;
            }
        }
        Ok(())
    }
}

impl Application for StuntDemo {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let entities = &mut engine.entities;

        let player = entities.new_entity()?;
        {
            let entity = entities.get_mut(player)?;
            entity.entity_type = EntityType::Player;
            entity.health = 100;
            entity.max_health = 100;
            entity.max_speed = 1.0;
            entity.power_ability = 1;
        }
        entities.set_behavior(player, Box::new(PlayerBehavior::new(20, self.stats.clone())))?;
        self.player = Some(player);

        for i in 0..BOT_COUNT {
            let bot = entities.new_entity()?;
            #[allow(clippy::cast_precision_loss)]
            let angle = i as f32 / BOT_COUNT as f32 * std::f32::consts::TAU;
            let entity = entities.get_mut(bot)?;
            entity.entity_type = EntityType::Bot;
            entity.position = Vec3::new(angle.cos() * 10.0, 0.0, angle.sin() * 10.0);
            entity.health = 20;
            entity.max_health = 20;
            entity.max_speed = 0.5;
            entities.set_behavior(bot, Box::new(BotBehavior::new(self.player_position.clone())))?;
            self.bots.push(bot);
        }

        log::info!("Spawned player and {} bots", self.bots.len());
        Ok(())
    }

    fn update(&mut self, entities: &mut EntitySystem, _delta_time: f32) -> Result<(), AppError> {
        self.frame += 1;
        let player = self
            .player
            .ok_or_else(|| AppError::GameLogic("player was never spawned".into()))?;
        let Ok(player_entity) = entities.get(player) else {
            // The player slot is reaped the frame after it dies
            self.player_gone = true;
            return Ok(());
        };
        let player_position = player_entity.position;
        self.player_position.set(player_position);

        self.projectiles.retain(|p| entities.is_alive(p.handle));
        self.bots.retain(|&bot| entities.is_alive(bot));

        if self.frame % FIRE_INTERVAL == 0 {
            for &bot in &self.bots {
                let entity = entities.get(bot)?;
                if !entity.state.is_active()
                    || (entity.position - player_position).magnitude() > FIRE_RANGE
                {
                    continue;
                }
                if let Some(handle) = Self::spawn_projectile(entities, bot, player_position)? {
                    self.projectiles.push(Projectile { handle, owner: bot });
                }
            }
        }

        self.resolve_contacts(entities, player)
    }

    fn should_quit(&self) -> bool {
        self.player_gone
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let stats = self.stats.borrow();
        log::info!(
            "Demo finished after {} frames: {} tricks landed, {} bailed, \
             {} bots left, {} live entities",
            engine.frame_count(),
            stats.landed,
            stats.bailed,
            self.bots.len(),
            engine.entities.len()
        );
    }
}

/// A surface shaped like a typical desktop swapchain
fn simulated_surface_support() -> SurfaceSupport {
    SurfaceSupport {
        capabilities: vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D { width: 1, height: 1 },
            max_image_extent: vk::Extent2D {
                width: 4096,
                height: 4096,
            },
            ..Default::default()
        },
        formats: vec![
            vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
        ],
        present_modes: vec![
            vk::PresentModeKHR::FIFO,
            vk::PresentModeKHR::MAILBOX,
            vk::PresentModeKHR::IMMEDIATE,
        ],
    }
}

/// Frame budget from the command line, defaulting when absent
fn parse_frames(arg: Option<String>) -> Result<u64, DemoError> {
    match arg {
        Some(value) => value
            .parse()
            .map_err(|source| DemoError::FrameCount { value, source }),
        None => Ok(DEFAULT_FRAMES),
    }
}

fn main() -> Result<(), DemoError> {
    logging::init_with_level(LevelFilter::Info);

    log::info!("Starting stunt demo");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            log::info!("Loading configuration from {path}");
            EngineConfig::load_from_file(&path)?
        }
        None => EngineConfig::default(),
    };
    let frames = parse_frames(args.next())?;

    let plan = SwapchainPlan::negotiate(&simulated_surface_support(), &config.swapchain, 0, 0)?;
    let mut surface = HeadlessSurface::new(&plan);

    let mut engine = Engine::new(config)?;
    let mut app = StuntDemo::new();

    match engine.run(&mut app, &mut surface, Some(frames)) {
        Ok(ran) => {
            log::info!("Stunt demo completed {ran} frames, {} draws", surface.total_draws);
            Ok(())
        }
        Err(e) => {
            log::error!("Stunt demo failed: {e}");
            Err(e.into())
        }
    }
}
