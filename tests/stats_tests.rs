use seabattle::{MatchResult, MemoryStats, PlayerId, PlayerIdentity, StatsStore};

#[test]
fn test_register_refreshes_name() {
    let mut stats = MemoryStats::new();
    stats.register(&PlayerIdentity::new("p1", "Old"));
    stats.register(&PlayerIdentity::new("p1", "New"));
    assert_eq!(stats.len(), 1);
    assert_eq!(stats.player(&PlayerId::from("p1")).unwrap().name, "New");
}

#[test]
fn test_record_outcome_accumulates() {
    let mut stats = MemoryStats::new();
    let id = PlayerId::from("p1");
    stats.register(&PlayerIdentity::new("p1", "One"));
    stats.record_outcome(&id, MatchResult::Win, 30, 20);
    stats.record_outcome(&id, MatchResult::Loss, 50, 12);
    let r = stats.player(&id).unwrap();
    assert_eq!((r.wins, r.losses, r.shots, r.hits), (1, 1, 80, 32));
    assert_eq!(r.games(), 2);
}

#[test]
fn test_unregistered_player_is_created_on_outcome() {
    let mut stats = MemoryStats::new();
    stats.record_outcome(&PlayerId::from("ghost"), MatchResult::Loss, 3, 0);
    let r = stats.player(&PlayerId::from("ghost")).unwrap();
    assert_eq!(r.name, "ghost");
    assert_eq!(r.losses, 1);
}

#[test]
fn test_top_players_ranking() {
    let mut stats = MemoryStats::new();
    let record = |stats: &mut MemoryStats, id: &str, wins: u32, losses: u32| {
        stats.register(&PlayerIdentity::new(id, id));
        for _ in 0..wins {
            stats.record_outcome(&PlayerId::from(id), MatchResult::Win, 0, 0);
        }
        for _ in 0..losses {
            stats.record_outcome(&PlayerId::from(id), MatchResult::Loss, 0, 0);
        }
    };
    record(&mut stats, "c", 3, 2);
    record(&mut stats, "a", 3, 2);
    record(&mut stats, "b", 3, 0);
    record(&mut stats, "d", 5, 9);
    record(&mut stats, "e", 0, 0);

    let top: Vec<_> = stats.top_players(4).into_iter().map(|r| r.id.0).collect();
    assert_eq!(top, vec!["d", "b", "a", "c"]);
    assert_eq!(stats.top_players(10).len(), 5);
    assert!(stats.top_players(0).is_empty());
}

#[test]
fn test_unknown_player() {
    let stats = MemoryStats::new();
    assert!(stats.is_empty());
    assert_eq!(stats.player(&PlayerId::from("x")), None);
}
