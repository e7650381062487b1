mod common;

use escapade::game::{Direction, HintResponse, PuzzleState, PuzzleType, RoomChange};

#[test]
fn full_manor_escape_persists_scores() {
    let (_tmp, config, store) = common::sample_store();
    let mut facade = common::facade_for(&config, &store);

    assert!(facade.register("alice", "initialPass1"));
    assert!(facade.login("alice", "initialPass1"));
    let listed: Vec<String> = facade.list_dungeons().into_iter().map(|d| d.id).collect();
    assert_eq!(listed, vec!["manor".to_string(), "crypt".to_string()]);

    assert!(facade.start_dungeon("manor"));
    let foyer = facade.enter_dungeon().expect("starting room");
    assert_eq!(foyer.id, "foyer");
    assert_eq!(foyer.puzzles.len(), 2);
    assert_eq!(foyer.puzzles[1].required_item.as_deref(), Some("BRASS_KEY"));

    // Foyer: the keypad needs the sphinx's key.
    let locked = facade.attempt_code_puzzle("keypad", "1847").unwrap();
    assert!(!locked.valid);
    assert_eq!(locked.new_state, PuzzleState::Init);
    assert!(matches!(facade.move_direction(Direction::North), RoomChange::Blocked(_)));
    assert!(facade.answer_riddle("sphinx", "  PIANO ").unwrap().valid);
    assert!(facade.attempt_code_puzzle("keypad", "1847").unwrap().valid);
    assert_eq!(facade.move_direction(Direction::North), RoomChange::Entered("library".into()));

    // Library: the attic hatch opens once both puzzles are solved.
    assert!(matches!(facade.move_direction(Direction::Up), RoomChange::Blocked(_)));
    assert!(facade.answer_scramble("shelves", "BOOK").unwrap().valid);
    let off = facade.align_shapes("mosaic", "circle:1,1,0;square:5,1,90").unwrap();
    assert!(!off.valid);
    assert!(off.message.contains("square"));
    assert!(facade.align_shapes("mosaic", "circle:1,1,0;square:3,1,90").unwrap().valid);
    assert_eq!(facade.move_direction(Direction::Up), RoomChange::Entered("attic".into()));

    // Attic: a flawless maze run.
    for step in ["R", "D", "D"] {
        assert!(facade.move_in_maze("crates", step).unwrap().valid);
    }
    assert!(facade.move_in_maze("crates", "R").unwrap().valid);
    assert!(!facade.is_dungeon_complete());

    // Conservatory is still unsolved.
    assert_eq!(facade.enter_room("conservatory"), RoomChange::Entered("conservatory".into()));
    assert_eq!(
        facade.slide_shape("tiles", "SLIDE a:RIGHT").unwrap().new_state,
        PuzzleState::Solved
    );
    assert!(facade.is_dungeon_complete());

    // 50 + 25 (quick-wit) + 100 + 50 + 150 + 150 + 50 (skylight) + 100
    assert_eq!(facade.session_score(), Some(675));
    let top = facade.top_score(3);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].username, "alice");
    assert_eq!(top[0].score, 675);

    // Everything landed on disk.
    let accounts = store.load_accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].score, 675);
    assert_eq!(accounts[0].achievements.len(), 2);
    assert_eq!(store.load_leaderboard().unwrap().len(), 1);
    assert!(store
        .list_progress_slots("alice")
        .unwrap()
        .contains(&"autosave".to_string()));

    // A fresh process sees the same account.
    let mut reloaded = common::facade_for(&config, &store);
    assert!(reloaded.login("ALICE", "initialPass1"));
    assert_eq!(reloaded.get_top_players(1)[0].score, 675);
    assert_eq!(reloaded.top_score(1)[0].score, 675);
}

#[test]
fn saved_slot_survives_a_restart() {
    let (_tmp, config, store) = common::sample_store();
    let mut facade = common::facade_for(&config, &store);
    assert!(facade.register("bob", "initialPass1"));
    assert!(facade.login("bob", "initialPass1"));
    assert!(facade.start_dungeon("manor"));
    facade.enter_dungeon();
    facade.answer_riddle("sphinx", "piano");
    assert!(facade.save_progress("s1"));

    let mut restarted = common::facade_for(&config, &store);
    assert!(restarted.login("bob", "initialPass1"));
    assert!(restarted.load_progress("s1"));
    assert_eq!(restarted.inventory_keys(), vec!["BRASS_KEY".to_string()]);
    let room = restarted.current_room().unwrap();
    assert_eq!(room.id, "foyer");
    assert_eq!(room.puzzles[0].state, PuzzleState::Solved);
    assert!(restarted.attempt_code_puzzle("keypad", "1847").unwrap().valid);
}

#[test]
fn views_and_hints_follow_the_session() {
    let (_tmp, config, store) = common::sample_store();
    let mut facade = common::facade_for(&config, &store);
    assert!(facade.view_rooms().is_empty());
    assert_eq!(facade.request_hint("sphinx"), HintResponse::Unavailable);

    assert!(facade.register("carol", "initialPass1"));
    assert!(facade.login("carol", "initialPass1"));
    assert!(facade.start_dungeon("manor"));
    assert!(facade.current_room().is_none());
    facade.enter_dungeon();

    let rooms = facade.view_rooms();
    assert_eq!(rooms.len(), 4);
    assert!(rooms[0].current && rooms[0].explored);
    assert!(!rooms[3].explored);
    let kinds: Vec<PuzzleType> = facade.view_puzzles().iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![PuzzleType::Riddle, PuzzleType::Code]);

    match facade.request_hint("sphinx") {
        HintResponse::Given(hint) => assert_eq!(hint.level, 1),
        other => panic!("expected a hint, got {:?}", other),
    }
    assert!(matches!(facade.request_hint("sphinx"), HintResponse::CoolingDown { .. }));
    assert!(facade.time_remaining_ms().unwrap() <= 1_800_000 - 10_000);

    assert!(facade.exit_dungeon());
    assert!(facade.view_rooms().is_empty());
    assert!(facade.logout());
    assert!(!facade.start_dungeon("manor"));
}
