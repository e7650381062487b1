use escapade::game::seed_loader::parse_dungeons;
use escapade::game::{Difficulty, Direction, PuzzleState, PuzzleType, RoomChange};
use escapade::storage::SAMPLE_DUNGEONS;

#[test]
fn bundled_content_builds_and_validates() {
    let dungeons = parse_dungeons(SAMPLE_DUNGEONS, 600_000).unwrap();
    assert_eq!(dungeons.len(), 2);
    for dungeon in &dungeons {
        dungeon.validate().unwrap();
    }

    let manor = &dungeons[0];
    assert_eq!(manor.id, "manor");
    assert_eq!(manor.base_time_budget_ms(), 30 * 60 * 1000);
    assert_eq!(manor.starting_room().unwrap().id, "foyer");
    let kinds: Vec<PuzzleType> = manor
        .rooms()
        .iter()
        .flat_map(|r| r.puzzles.iter().map(|p| p.puzzle_type()))
        .collect();
    for kind in [
        PuzzleType::Riddle,
        PuzzleType::Code,
        PuzzleType::WordScramble,
        PuzzleType::ShapeMatch,
        PuzzleType::SlideShape,
        PuzzleType::Maze,
    ] {
        assert!(kinds.contains(&kind), "manor is missing a {:?}", kind);
    }
    assert_eq!(manor.achievements.len(), 2);
}

#[test]
fn manor_library_stays_sealed_from_the_conservatory() {
    let mut manor = parse_dungeons(SAMPLE_DUNGEONS, 600_000).unwrap().remove(0);
    manor.enter();
    assert_eq!(manor.change_room(Direction::East), RoomChange::Entered("conservatory".into()));

    // The attic's open ladder down does not help while the attic itself is unreachable.
    match manor.enter_room("library") {
        RoomChange::Blocked(text) => assert!(text.contains("north door")),
        other => panic!("library should be sealed, got {:?}", other),
    }
    assert!(matches!(manor.enter_room("attic"), RoomChange::Blocked(_)));
    assert_eq!(manor.current_room().unwrap().id, "conservatory");
    assert_eq!(manor.puzzle("keypad").unwrap().state(), PuzzleState::Init);
    assert_eq!(manor.enter_room("foyer"), RoomChange::Entered("foyer".into()));
}

#[test]
fn legacy_exit_slots_map_to_directions() {
    let dungeons = parse_dungeons(SAMPLE_DUNGEONS, 600_000).unwrap();
    let crypt = &dungeons[1];
    assert_eq!(crypt.difficulty(), Difficulty::Easy);
    assert_eq!(crypt.base_time_budget_ms(), 15 * 60 * 1000);
    assert_eq!(crypt.starting_room().unwrap().id, "gate");

    let gate = crypt.room("gate").unwrap();
    assert_eq!(gate.exit(Direction::East).unwrap().target_room, "hall");

    let hall = crypt.room("hall").unwrap();
    assert_eq!(hall.exit(Direction::West).unwrap().target_room, "gate");
    let sealed = hall.exit(Direction::North).unwrap();
    assert_eq!(sealed.target_room, "tomb");
    assert!(sealed.locked);
    assert!(sealed.gating_puzzles.is_empty());
    assert!(!hall.gate_satisfied(sealed));
}

#[test]
fn time_limits_fall_back_to_the_default() {
    let json = r#"[
        {"id": "a", "name": "A", "time_limit": "ten minutes", "rooms": [{"id": "r", "name": "R"}]},
        {"id": "b", "name": "B", "rooms": [{"id": "r", "name": "R"}]},
        {"id": "c", "name": "C", "time_limit": 90000, "rooms": [{"id": "r", "name": "R"}]}
    ]"#;
    let dungeons = parse_dungeons(json, 600_000).unwrap();
    assert_eq!(dungeons[0].base_time_budget_ms(), 600_000);
    assert_eq!(dungeons[1].base_time_budget_ms(), 600_000);
    assert_eq!(dungeons[2].base_time_budget_ms(), 90_000);
}

#[test]
fn malformed_content_is_rejected() {
    let no_goal = r####"[{"id": "m", "name": "M", "rooms": [
        {"id": "r", "name": "R", "puzzles": [{"id": "p", "maze": ["S..", "###"]}]}
    ]}]"####;
    assert!(parse_dungeons(no_goal, 600_000).is_err());

    let bad_direction = r#"[{"id": "m", "name": "M", "rooms": [
        {"id": "r", "name": "R", "exits": {"sideways": "r"}}
    ]}]"#;
    assert!(parse_dungeons(bad_direction, 600_000).is_err());

    assert!(parse_dungeons("not json", 600_000).is_err());
}
