//! Integration tests for the SQLite player table, including a full game over it.

use mafia_game::{
    GameError, GameSession, Player, PlayerStore, PlayerUpdate, Role, RoundEngine, RoundKind,
    SqliteStore, Winner,
};

fn open() -> SqliteStore {
    SqliteStore::open(":memory:").unwrap()
}

#[test]
fn insert_and_select_round_trip_all_fields() {
    let store = open();
    let stored = Player {
        role: Role::Mafia,
        mafia_votes: 2,
        citizen_votes: 1,
        has_voted: true,
        is_dead: true,
        ..Player::new(42, "Vito")
    };
    store.transaction(|tx| tx.insert(stored.clone())).unwrap();

    let loaded = store.transaction(|tx| tx.select_by_id(42)).unwrap();
    assert_eq!(loaded, Some(stored));
    assert_eq!(store.transaction(|tx| tx.select_by_id(7)).unwrap(), None);
}

#[test]
fn duplicate_id_maps_to_duplicate_error() {
    let store = open();
    store.transaction(|tx| tx.insert(Player::new(1, "Ann"))).unwrap();
    let err = store
        .transaction(|tx| tx.insert(Player::new(1, "Ben")))
        .unwrap_err();
    assert_eq!(err, GameError::DuplicateId(1));
}

#[test]
fn partial_update_touches_only_given_fields() {
    let store = open();
    store.transaction(|tx| tx.insert(Player::new(1, "Ann"))).unwrap();
    store
        .transaction(|tx| {
            tx.update_fields(
                1,
                &PlayerUpdate {
                    citizen_votes: Some(3),
                    has_voted: Some(true),
                    ..PlayerUpdate::default()
                },
            )
        })
        .unwrap();

    let p = store.transaction(|tx| tx.select_by_id(1)).unwrap().unwrap();
    assert_eq!(p.citizen_votes, 3);
    assert!(p.has_voted);
    assert_eq!(p.mafia_votes, 0);
    assert_eq!(p.role, Role::Unassigned);
    assert!(!p.is_dead);

    // Empty update is accepted and changes nothing.
    store
        .transaction(|tx| tx.update_fields(1, &PlayerUpdate::default()))
        .unwrap();
    assert_eq!(store.transaction(|tx| tx.select_by_id(1)).unwrap(), Some(p));
}

#[test]
fn failed_transaction_rolls_back() {
    let store = open();
    store.transaction(|tx| tx.insert(Player::new(1, "Ann"))).unwrap();

    let result: Result<(), GameError> = store.transaction(|tx| {
        tx.update_fields(1, &PlayerUpdate::killed())?;
        tx.insert(Player::new(2, "Ben"))?;
        tx.insert(Player::new(1, "Duplicate"))
    });
    assert_eq!(result, Err(GameError::DuplicateId(1)));

    let rows = store.transaction(|tx| tx.select_all()).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_dead);
}

#[test]
fn select_where_filters_in_id_order() {
    let store = open();
    store
        .transaction(|tx| {
            tx.insert(Player::new(3, "Cat"))?;
            tx.insert(Player::new(1, "Ann"))?;
            tx.insert(Player::new(2, "Ben"))?;
            tx.update_fields(2, &PlayerUpdate::killed())
        })
        .unwrap();
    let alive = store
        .transaction(|tx| tx.select_where(&|p: &Player| p.is_alive()))
        .unwrap();
    let ids: Vec<_> = alive.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn concurrent_votes_lose_no_increment() {
    const VOTERS: i64 = 24;
    let store = open();
    store
        .transaction(|tx| {
            tx.insert(Player::new(0, "Target"))?;
            for id in 1..=VOTERS {
                tx.insert(Player::new(id, &format!("voter{id}")))?;
            }
            Ok(())
        })
        .unwrap();

    std::thread::scope(|scope| {
        for id in 1..=VOTERS {
            let store = &store;
            scope.spawn(move || {
                let kind = if id % 2 == 0 {
                    RoundKind::Mafia
                } else {
                    RoundKind::Citizen
                };
                let name = format!("voter{id}");
                assert!(RoundEngine::new(store)
                    .cast_vote(kind, &name, id, "Target")
                    .unwrap());
            });
        }
    });

    let target = store.transaction(|tx| tx.select_by_id(0)).unwrap().unwrap();
    assert_eq!(target.mafia_votes, VOTERS as u32 / 2);
    assert_eq!(target.citizen_votes, VOTERS as u32 / 2);
}

#[test]
fn full_game_over_sqlite() {
    let mut session = GameSession::seeded(open(), 99);
    for (id, name) in [(1, "A"), (2, "B"), (3, "C"), (4, "D")] {
        session.register_player(id, name).unwrap();
    }
    session.start_game().unwrap();

    let mafia = session.roster().list_by_role(Role::Mafia).unwrap();
    assert_eq!(mafia.len(), 1);
    let don = &mafia[0];

    // Quiet night, then everyone votes the mafia out.
    assert_eq!(session.resolve_round().unwrap().eliminated, None);
    for p in session.roster().players().unwrap() {
        assert!(session.cast_vote(p.id, &p.username, &don.username).unwrap());
    }
    let day = session.resolve_round().unwrap();
    assert_eq!(day.eliminated.as_deref(), Some(don.username.as_str()));
    assert_eq!(day.winner, Some(Winner::Citizens));
}
