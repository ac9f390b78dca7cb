//! Level archive inspector.
//!
//! ```bash
//! cargo run --bin mazecast -- MAPHEAD.WL6 GAMEMAPS.WL6 --list
//! cargo run --bin mazecast -- MAPHEAD.WL6 GAMEMAPS.WL6 --level 3 --plane 1
//! ```

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;

use mazecast::{
    wad::{ArchiveMap, GameMaps, LevelMap, SPECIAL_PLANE, WALL_PLANE, standard_catalog},
    world::{Map, Structure},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Level directory file (MAPHEAD)
    #[arg(value_name = "MAPHEAD")]
    maphead: PathBuf,

    /// Level data file (GAMEMAPS)
    #[arg(value_name = "GAMEMAPS")]
    gamemaps: PathBuf,

    /// Level to dump
    #[arg(long, default_value_t = 0)]
    level: usize,

    /// Plane to dump: 0 walls, 1 specials, 2 raw codes of the third plane
    #[arg(long, default_value_t = 0)]
    plane: usize,

    /// Print the level directory instead of a dump
    #[arg(long)]
    list: bool,

    /// Print plane codes in hex instead of symbols
    #[arg(long)]
    raw: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opts = Opts::parse();

    let archive = GameMaps::from_files(&opts.maphead, &opts.gamemaps).with_context(|| {
        format!(
            "opening {} / {}",
            opts.maphead.display(),
            opts.gamemaps.display()
        )
    })?;

    if opts.list {
        return list(&archive);
    }

    if opts.level >= archive.level_count() {
        bail!(
            "level {} out of range ({} levels)",
            opts.level,
            archive.level_count()
        );
    }
    let level = archive.load_level(opts.level)?;
    println!("{} ({}x{})", level.name, level.width, level.height);

    if opts.raw || opts.plane > SPECIAL_PLANE {
        return dump_raw(&level, opts.plane);
    }

    let catalog = standard_catalog(None)?;
    let map = ArchiveMap::new(&level, &catalog);
    println!(
        "start ({:.1}, {:.1}) facing {:.0}°",
        map.start_x(),
        map.start_y(),
        map.start_dir().to_degrees()
    );
    for y in (0..map.height()).rev() {
        let row: String = (0..map.width())
            .map(|x| {
                if opts.plane == WALL_PLANE {
                    wall_glyph(map.structure_at(x, y))
                } else {
                    special_glyph(map.special_at(x, y))
                }
            })
            .collect();
        println!("{row}");
    }
    Ok(())
}

fn list(archive: &GameMaps) -> anyhow::Result<()> {
    println!("magic {:#06x}, {} levels", archive.magic(), archive.level_count());
    for idx in 0..archive.level_count() {
        let h = archive.level_header(idx)?;
        let planes: String = (0..3)
            .map(|p| if h.has_plane(p) { char::from(b'0' + p as u8) } else { '-' })
            .collect();
        println!("{idx:3}  {:<16} {:3}x{:<3} planes {planes}", h.name, h.width, h.height);
    }
    Ok(())
}

fn dump_raw(level: &LevelMap, plane: usize) -> anyhow::Result<()> {
    let Some(words) = level.plane(plane) else {
        bail!("{} has no plane {plane}", level.name);
    };
    for row in words.chunks(level.width.max(1)) {
        let line: Vec<String> = row.iter().map(|w| format!("{w:04x}")).collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}

fn wall_glyph(s: &Structure) -> char {
    match (s.is_wall(), s.is_obstacle()) {
        (false, _) => '.',
        (true, false) => 'D',
        (true, true) if s.name == "unknown" => '?',
        (true, true) => '#',
    }
}

fn special_glyph(s: &Structure) -> char {
    if s.name.starts_with("start") {
        '@'
    } else if s.is_item() {
        '$'
    } else if s.is_decoration() {
        if s.is_obstacle() { 'o' } else { '*' }
    } else if s.name == "none" {
        '.'
    } else if s.name == "unknown special" {
        '?'
    } else {
        'x'
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazecast::world::StructureFlags;

    #[test]
    fn glyphs() {
        let wall =
            Structure::new("wood").with_flags(StructureFlags::WALL | StructureFlags::OBSTACLE);
        let door = Structure::new("door").with_flags(StructureFlags::WALL);
        assert_eq!(wall_glyph(&wall), '#');
        assert_eq!(wall_glyph(&door), 'D');
        assert_eq!(wall_glyph(&Structure::new("none")), '.');

        let barrel = Structure::new("barrel")
            .with_flags(StructureFlags::DECORATION | StructureFlags::OBSTACLE);
        assert_eq!(special_glyph(&barrel), 'o');
        assert_eq!(special_glyph(&Structure::new("start facing east")), '@');
        assert_eq!(special_glyph(&Structure::new("guard")), 'x');
    }
}
