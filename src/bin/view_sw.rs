use anyhow::Context;
use clap::Parser;
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};
use std::{
    f64::consts::TAU,
    path::PathBuf,
    time::{Duration, Instant},
};

use mazecast::{
    engine::cast_view_par,
    renderer::{Ambient, Lighting, PaintMode, RendererExt, Software},
    wad::{ArchiveMap, GameMaps, standard_catalog},
    world::Camera,
};

/// Distance covered per frame while a move key is held.
const MOVE_STEP: f64 = 0.2;
/// 4° per frame.
const TURN_STEP: f64 = TAU / 90.0;
/// How close the camera may get to a wall face.
const BODY_RADIUS: f64 = 0.25;

/// Walk through one level of a MAPHEAD/GAMEMAPS archive.
///
/// Arrows move and turn, Alt + ←/→ strafes, T toggles textures,
/// A cycles the ambient light, O toggles the torch, Esc quits.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    #[arg(value_name = "MAPHEAD")]
    maphead: PathBuf,

    #[arg(value_name = "GAMEMAPS")]
    gamemaps: PathBuf,

    /// Level index
    #[arg(long, default_value_t = 0)]
    level: usize,

    /// Directory of `WAL00000.png`-style textures
    #[arg(long, value_name = "DIR")]
    textures: Option<PathBuf>,

    /// Window pixels per rendered pixel (1, 2 or 4)
    #[arg(long, default_value_t = 2)]
    scale: u8,

    #[arg(long, default_value_t = 480)]
    width: usize,

    #[arg(long, default_value_t = 300)]
    height: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();

    let archive = GameMaps::from_files(&opts.maphead, &opts.gamemaps)
        .with_context(|| format!("opening {}", opts.gamemaps.display()))?;
    let level = archive.load_level(opts.level)?;
    let catalog = standard_catalog(opts.textures.as_deref())?;
    let map = ArchiveMap::new(&level, &catalog);

    let (w, h) = (opts.width, opts.height);
    let scale = match opts.scale {
        1 => Scale::X1,
        4 => Scale::X4,
        _ => Scale::X2,
    };

    let mut camera = Camera::at_start(&map);
    let mut renderer = Software::new(
        PaintMode::Textured,
        Lighting {
            ambient: Ambient::Full,
            torch: false,
        },
    );
    renderer.crosshair = true;

    let mut win = Window::new(
        &format!("mazecast - {}", map.name()),
        w,
        h,
        WindowOptions {
            scale,
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(50);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        /* movement --------------------------------------------------------- */
        if win.is_key_down(Key::Up) {
            camera.walk(&map, MOVE_STEP, 0.0, BODY_RADIUS);
        }
        if win.is_key_down(Key::Down) {
            camera.walk(&map, -MOVE_STEP, 0.0, BODY_RADIUS);
        }

        let alt = win.is_key_down(Key::LeftAlt) || win.is_key_down(Key::RightAlt);
        if alt {
            /* Alt + ←/→  = strafe */
            if win.is_key_down(Key::Left) {
                camera.walk(&map, 0.0, -MOVE_STEP, BODY_RADIUS);
            }
            if win.is_key_down(Key::Right) {
                camera.walk(&map, 0.0, MOVE_STEP, BODY_RADIUS);
            }
        } else {
            /* plain ←/→   = turn   */
            if win.is_key_down(Key::Left) {
                camera.turn(TURN_STEP);
            }
            if win.is_key_down(Key::Right) {
                camera.turn(-TURN_STEP);
            }
        }

        /* display toggles -------------------------------------------------- */
        if win.is_key_pressed(Key::T, KeyRepeat::No) {
            renderer.mode = renderer.mode.toggled();
        }
        if win.is_key_pressed(Key::A, KeyRepeat::No) {
            renderer.lighting.ambient = renderer.lighting.ambient.next();
            log::info!("ambient light: {:?}", renderer.lighting.ambient);
        }
        if win.is_key_pressed(Key::O, KeyRepeat::No) {
            renderer.lighting.torch = !renderer.lighting.torch;
        }

        /* draw */
        let hits = cast_view_par(w, camera.pos(), camera.yaw(), &map);
        let mut shown = Ok(());
        renderer.draw_frame(w, h, &hits, &catalog, |fb, w, h| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            shown = win.update_with_buffer(fb, w, h);
        });
        shown?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            log::info!("avg frame: {:.2} ms ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
