use std::path::Path;

use tank_boy::terrain::*;

fn block(x: f32, y: f32, w: f32, h: f32) -> Block {
    Block {
        x,
        y,
        width: w,
        height: h,
        surface: Surface::Ground,
    }
}

fn make_terrain() -> Terrain {
    // A floor plus one raised platform.
    Terrain::new(
        vec![block(0.0, 500.0, 2000.0, 100.0), block(300.0, 400.0, 100.0, 20.0)],
        2000.0,
        600.0,
    )
}

// ── Surface ───────────────────────────────────────────────────────────────────

#[test]
fn surface_names() {
    assert_eq!(Surface::from_name("grass"), Surface::Grass);
    assert_eq!(Surface::from_name(" Grass "), Surface::Grass);
    assert_eq!(Surface::from_name("ground"), Surface::Ground);
    assert_eq!(Surface::from_name("lava"), Surface::Ground);
    assert_eq!(Surface::from_name(""), Surface::Ground);
}

// ── from_rows ─────────────────────────────────────────────────────────────────

#[test]
fn from_rows_skips_header_and_builds_blocks() {
    let text = "type,start_x,start_y,end_x,end_y\n\
                grass,0,500,200,510\n\
                ground,0,510,200,600\n";
    let t = Terrain::from_rows(text, 2000.0, 600.0).expect("level should parse");

    assert_eq!(t.blocks().len(), 2);
    assert_eq!(t.blocks()[0].surface, Surface::Grass);
    assert_eq!(t.blocks()[0].width, 200.0);
    assert_eq!(t.blocks()[0].height, 10.0);
    assert_eq!(t.blocks()[1].surface, Surface::Ground);
    assert_eq!(t.width(), 2000.0);
    assert_eq!(t.height(), 600.0);
}

#[test]
fn from_rows_defaults_unknown_surface_to_ground() {
    let text = "header\nbrick,0,0,10,10\n";
    let t = Terrain::from_rows(text, 100.0, 100.0).expect("level should parse");
    assert_eq!(t.blocks()[0].surface, Surface::Ground);
}

#[test]
fn from_rows_skips_malformed_rows() {
    let text = "header\n\
                grass,0,500,200,510\n\
                ground,not-a-number,0,1,1\n\
                ground,1,2\n\
                \n\
                ground,0,510,200,600\n";
    let t = Terrain::from_rows(text, 2000.0, 600.0).expect("level should parse");
    assert_eq!(t.blocks().len(), 2);
}

#[test]
fn from_rows_with_no_blocks_is_an_error() {
    let result = Terrain::from_rows("type,start_x,start_y,end_x,end_y\n", 100.0, 100.0);
    assert!(matches!(result, Err(LevelError::Empty)));

    // The header alone is skipped even if it looks like data.
    let result = Terrain::from_rows("grass,0,0,10,10\n", 100.0, 100.0);
    assert!(matches!(result, Err(LevelError::Empty)));
}

#[test]
fn load_missing_file_is_io_error() {
    let result = Terrain::load(Path::new("/definitely/not/a/level.csv"), 100.0, 100.0);
    assert!(matches!(result, Err(LevelError::Io(_))));
}

// ── collides_point ────────────────────────────────────────────────────────────

#[test]
fn collides_point_inside_and_outside() {
    let t = make_terrain();
    assert!(t.collides_point(50.0, 550.0));
    assert!(t.collides_point(350.0, 410.0));
    assert!(!t.collides_point(50.0, 450.0));
}

#[test]
fn collides_point_is_half_open() {
    let t = make_terrain();
    // Left/top edges inclusive.
    assert!(t.collides_point(300.0, 400.0));
    // Right/bottom edges exclusive.
    assert!(!t.collides_point(400.0, 410.0));
    assert!(!t.collides_point(350.0, 420.0));
}

#[test]
fn empty_terrain_never_collides() {
    let t = Terrain::new(Vec::new(), 100.0, 100.0);
    assert!(!t.collides_point(10.0, 10.0));
    assert!(!t.collides_rect(0.0, 0.0, 100.0, 100.0));
    assert!(t.query_region(50.0, 50.0, 100.0, 100.0).is_empty());
}

// ── collides_rect ─────────────────────────────────────────────────────────────

#[test]
fn collides_rect_overlap() {
    let t = make_terrain();
    assert!(t.collides_rect(10.0, 490.0, 32.0, 20.0));
    assert!(!t.collides_rect(10.0, 100.0, 32.0, 20.0));
}

#[test]
fn collides_rect_touching_is_not_overlap() {
    let t = make_terrain();
    // Resting exactly on the floor.
    assert!(!t.collides_rect(10.0, 480.0, 32.0, 20.0));
    // Flush against the platform's left side.
    assert!(!t.collides_rect(268.0, 405.0, 32.0, 10.0));
}

// ── ground_level ──────────────────────────────────────────────────────────────

#[test]
fn ground_level_is_topmost_surface() {
    let t = make_terrain();
    assert_eq!(t.ground_level(50.0), 500.0);
    assert_eq!(t.ground_level(350.0), 400.0);
}

#[test]
fn ground_level_without_blocks_is_world_height() {
    let t = Terrain::new(vec![block(0.0, 500.0, 100.0, 100.0)], 2000.0, 600.0);
    assert_eq!(t.ground_level(1500.0), 600.0);
}

#[test]
fn ground_level_span_uses_body_width() {
    let t = make_terrain();
    // A body whose right edge pokes onto the platform stands on it.
    assert_eq!(t.ground_level_span(280.0, 32.0), 400.0);
    // Flush to the left of the platform it does not.
    assert_eq!(t.ground_level_span(268.0, 32.0), 500.0);
}

// ── query_region ──────────────────────────────────────────────────────────────

#[test]
fn query_region_returns_intersecting_blocks() {
    let t = make_terrain();
    let hits = t.query_region(350.0, 410.0, 40.0, 10.0);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].y, 400.0);

    let hits = t.query_region(350.0, 450.0, 200.0, 200.0);
    assert_eq!(hits.len(), 2);

    let hits = t.query_region(1000.0, 100.0, 50.0, 50.0);
    assert!(hits.is_empty());
}

// ── rolling_hills ─────────────────────────────────────────────────────────────

#[test]
fn rolling_hills_stays_in_band() {
    let (w, h) = (4000.0, 2160.0);
    let t = Terrain::rolling_hills(w, h, 16.0);

    let mut x = 0.0;
    while x < w {
        let g = t.ground_level(x);
        assert!(g >= h - 300.0 && g <= h - 50.0, "ground at x={x} was {g}");
        x += 37.0;
    }
}

#[test]
fn rolling_hills_has_grass_caps_over_solid_ground() {
    let t = Terrain::rolling_hills(1000.0, 2160.0, 20.0);
    assert_eq!(t.blocks().len(), 100);

    let top = t.ground_level(10.0);
    assert!(t.collides_point(10.0, top));
    assert!(t.collides_point(10.0, 2159.0));
    assert!(!t.collides_point(10.0, top - 1.0));

    let cap = t.query_region(10.0, top + 1.0, 1.0, 1.0);
    assert!(cap.iter().any(|b| b.surface == Surface::Grass));
}
