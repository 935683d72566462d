use std::sync::Arc;

use chrono::NaiveDate;
use speculate2::speculate;

use habit_berserk::error::StoreError;
use habit_berserk::models::*;
use habit_berserk::storage::{KeyValueStore, MemoryStore, Namespace, SqliteStore};
use habit_berserk::store::{defaults, progression, reducer, today, ProgressState, ProgressStore};

fn day(s: &str) -> NaiveDate {
    s.parse().expect("bad date literal")
}

fn quest_input(title: &str, xp_reward: u32) -> CreateQuestInput {
    CreateQuestInput {
        title: title.to_string(),
        description: String::new(),
        quest_type: QuestType::Custom,
        xp_reward,
        stat_boosts: StatBoosts::default(),
        is_persistent: false,
        max_completions: None,
    }
}

speculate! {
    before {
        let storage = MemoryStore::new();
        let mut store = ProgressStore::new(Arc::new(storage.clone()));
        store.initialize("u1");
    }

    describe "xp curve" {
        it "matches floor(100 * 1.2^(level-1))" {
            assert_eq!(progression::xp_to_next_level(1), 100);
            assert_eq!(progression::xp_to_next_level(2), 120);
            assert_eq!(progression::xp_to_next_level(3), 144);
        }

        it "levels up exactly once when a reward crosses the threshold" {
            // xp 90 of 100, then +50: level 2 with the threshold subtracted
            let mut state = ProgressState::default();
            progression::award_xp(&mut state.character, 90);
            assert_eq!(state.character.level, 1);
            assert_eq!(state.character.xp, 90);

            let quest = reducer::add_quest(&mut state, quest_input("Spar", 50));
            reducer::complete_quest(&mut state, quest.id, day("2024-01-01"), chrono::Utc::now())
                .expect("completion should apply");

            assert_eq!(state.character.level, 2);
            assert_eq!(state.character.xp, 40);
            assert_eq!(state.character.xp_to_next_level, 120);
        }

        it "supports multi-level jumps from a single award" {
            let mut state = ProgressState::default();
            // 100 + 120 + 10 clears two thresholds with 10 left over
            progression::award_xp(&mut state.character, 230);
            assert_eq!(state.character.level, 3);
            assert_eq!(state.character.xp, 10);
            assert_eq!(state.character.xp_to_next_level, 144);
        }
    }

    describe "complete_quest" {
        it "awards xp, stat boosts, and records one instance" {
            let quest = store.add_quest(CreateQuestInput {
                stat_boosts: StatBoosts::strength(2),
                ..quest_input("Test", 50)
            });

            store.complete_quest(quest.id, Some(day("2024-01-01")))
                .expect("completion should apply");

            assert_eq!(store.character().xp, 50);
            assert_eq!(store.character().stats.strength, 12);
            let quest = store.quest(quest.id).expect("quest should exist");
            assert_eq!(quest.completed_instances.len(), 1);
            assert_eq!(quest.completion_count, 1);
            // default max_completions of 1 means the quest terminates here
            assert_eq!(quest.status, QuestStatus::Completed);
        }

        it "is idempotent per calendar date" {
            let quest = store.add_quest(CreateQuestInput {
                max_completions: Some(5),
                stat_boosts: StatBoosts::skill(1),
                ..quest_input("Practice", 30)
            });

            store.complete_quest(quest.id, Some(day("2024-01-01")))
                .expect("first completion should apply");
            let err = store.complete_quest(quest.id, Some(day("2024-01-01")))
                .expect_err("second completion on the same date must be rejected");

            assert_eq!(err, StoreError::DuplicateCompletion {
                id: quest.id,
                date: day("2024-01-01"),
            });
            assert_eq!(store.character().xp, 30);
            assert_eq!(store.character().stats.skill, 11);
            assert_eq!(store.quest(quest.id).unwrap().completed_instances.len(), 1);
        }

        it "rejects completion past the cap" {
            let quest = store.add_quest(CreateQuestInput {
                max_completions: Some(2),
                ..quest_input("Workout", 10)
            });

            store.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            store.complete_quest(quest.id, Some(day("2024-01-02"))).unwrap();
            assert_eq!(store.quest(quest.id).unwrap().status, QuestStatus::Completed);

            let err = store.complete_quest(quest.id, Some(day("2024-01-03")))
                .expect_err("capped quest must reject further completions");
            assert!(matches!(err, StoreError::CompletionCapReached { .. }));
            assert_eq!(store.character().xp, 20);
        }

        it "reopens a failed quest once a completion lands" {
            let quest = store.add_quest(CreateQuestInput {
                max_completions: Some(3),
                ..quest_input("Comeback", 10)
            });

            store.fail_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            assert_eq!(store.quest(quest.id).unwrap().status, QuestStatus::Failed);

            store.complete_quest(quest.id, Some(day("2024-01-02")))
                .expect("completion should apply");

            let quest = store.quest(quest.id).expect("quest should exist");
            // below the cap, so the quest goes back to Active
            assert_eq!(quest.status, QuestStatus::Active);
            assert_eq!(quest.failed_instances.len(), 1);
            assert_eq!(quest.completed_instances.len(), 1);
        }

        it "saturates xp and stats instead of overflowing" {
            let quest = store.add_quest(CreateQuestInput {
                stat_boosts: StatBoosts::strength(u32::MAX),
                max_completions: Some(2),
                ..quest_input("Limit break", u32::MAX)
            });

            store.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            store.complete_quest(quest.id, Some(day("2024-01-02"))).unwrap();

            assert_eq!(store.character().stats.strength, u32::MAX);
            assert!(store.character().xp < store.character().xp_to_next_level);
        }

        it "is a no-op for an unknown quest id" {
            let before = store.character().clone();
            let err = store.complete_quest(uuid::Uuid::new_v4(), Some(day("2024-01-01")))
                .expect_err("unknown id must be rejected");
            assert!(matches!(err, StoreError::QuestNotFound(_)));
            assert_eq!(store.character(), &before);
        }
    }

    describe "streak" {
        it "increments across consecutive days and resets after a gap" {
            let quest = store.add_quest(CreateQuestInput {
                max_completions: Some(10),
                ..quest_input("Run", 5)
            });

            store.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            assert_eq!(store.character().streak, 1);

            store.complete_quest(quest.id, Some(day("2024-01-02"))).unwrap();
            assert_eq!(store.character().streak, 2);

            // same day again (different quest) leaves the streak alone
            let other = store.add_quest(quest_input("Stretch", 5));
            store.complete_quest(other.id, Some(day("2024-01-02"))).unwrap();
            assert_eq!(store.character().streak, 2);

            store.complete_quest(quest.id, Some(day("2024-01-05"))).unwrap();
            assert_eq!(store.character().streak, 1);
        }
    }

    describe "uncheck_quest" {
        it "reverts exactly the instance's xp and boosts" {
            let quest = store.add_quest(CreateQuestInput {
                stat_boosts: StatBoosts::wisdom(3),
                ..quest_input("Journal", 40)
            });

            let stats_before = store.character().stats;
            store.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            store.uncheck_quest(quest.id, day("2024-01-01"))
                .expect("uncheck should apply");

            assert_eq!(store.character().xp, 0);
            assert_eq!(store.character().stats, stats_before);
            let quest = store.quest(quest.id).expect("quest should exist");
            assert!(quest.completed_instances.is_empty());
            assert_eq!(quest.completion_count, 0);
            assert_eq!(quest.status, QuestStatus::Active);
        }

        it "does not replay level-ups downward" {
            let quest = store.add_quest(quest_input("Epic", 150));
            store.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            assert_eq!(store.character().level, 2);
            assert_eq!(store.character().xp, 50);

            store.uncheck_quest(quest.id, day("2024-01-01")).unwrap();
            // xp saturates at zero; the level and its threshold stand
            assert_eq!(store.character().level, 2);
            assert_eq!(store.character().xp, 0);
            assert_eq!(store.character().xp_to_next_level, 120);
        }

        it "rejects a date with no recorded instance" {
            let quest = store.add_quest(quest_input("Read", 10));
            let err = store.uncheck_quest(quest.id, day("2024-01-01"))
                .expect_err("nothing to uncheck");
            assert_eq!(err, StoreError::InstanceNotFound {
                id: quest.id,
                date: day("2024-01-01"),
            });
        }
    }

    describe "fail_quest" {
        it "resets the streak unconditionally and keeps completions" {
            let quest = store.add_quest(CreateQuestInput {
                max_completions: Some(10),
                ..quest_input("Gym", 5)
            });
            store.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            store.complete_quest(quest.id, Some(day("2024-01-02"))).unwrap();
            assert_eq!(store.character().streak, 2);

            store.fail_quest(quest.id, Some(day("2024-01-03")))
                .expect("failure should apply");

            assert_eq!(store.character().streak, 0);
            let quest = store.quest(quest.id).expect("quest should exist");
            assert_eq!(quest.status, QuestStatus::Failed);
            assert_eq!(quest.completed_instances.len(), 2);
            assert_eq!(quest.failed_instances.len(), 1);
            assert_eq!(quest.failed_instances[0].xp, 0);
        }
    }

    describe "delete_quest" {
        it "removes the quest without touching the character" {
            let quest = store.add_quest(quest_input("Doomed", 25));
            store.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            let xp = store.character().xp;

            store.delete_quest(quest.id).expect("delete should apply");

            assert!(store.quest(quest.id).is_none());
            assert_eq!(store.character().xp, xp);
        }

        it "rejects an unknown id" {
            let err = store.delete_quest(uuid::Uuid::new_v4())
                .expect_err("unknown id must be rejected");
            assert!(matches!(err, StoreError::QuestNotFound(_)));
        }
    }

    describe "default seeding" {
        it "seeds the 7-quest starter catalog exactly once" {
            let mut state = ProgressState::default();
            reducer::seed_default_quests(&mut state);
            reducer::seed_default_quests(&mut state);

            assert_eq!(state.quests.len(), 7);
            for title in [
                "Meditation",
                "Journaling",
                "Learning & Practicing",
                "Yoga",
                "Reading",
                "Workout 3x",
                "Monthly Review",
            ] {
                let count = state.quests.iter().filter(|q| q.title == title).count();
                assert_eq!(count, 1, "expected exactly one '{}' quest", title);
            }
        }

        it "seeds on initialize for a fresh user" {
            let dailies = store.quests_by_type(QuestType::Daily);
            assert_eq!(dailies.len(), 5);
            assert_eq!(store.quests_by_type(QuestType::Weekly).len(), 1);
            assert_eq!(store.quests_by_type(QuestType::Monthly).len(), 1);

            let workout = store.quests().iter()
                .find(|q| q.title == "Workout 3x")
                .expect("weekly workout should be seeded");
            assert_eq!(workout.max_completions, 3);
        }
    }

    describe "daily refresh" {
        it "clears stale instances and reopens the quest" {
            let mut state = ProgressState::default();
            reducer::seed_default_quests(&mut state);
            let id = state.quests[0].id;
            reducer::complete_quest(&mut state, id, day("2024-01-01"), chrono::Utc::now()).unwrap();
            assert_eq!(state.quests[0].status, QuestStatus::Completed);

            reducer::refresh_daily_quests(&mut state, day("2024-01-02"));

            assert!(state.quests[0].completed_instances.is_empty());
            assert_eq!(state.quests[0].completion_count, 0);
            assert_eq!(state.quests[0].status, QuestStatus::Active);
        }

        it "keeps today's completion intact" {
            let mut state = ProgressState::default();
            reducer::seed_default_quests(&mut state);
            let id = state.quests[0].id;
            reducer::complete_quest(&mut state, id, day("2024-01-02"), chrono::Utc::now()).unwrap();

            reducer::refresh_daily_quests(&mut state, day("2024-01-02"));

            assert_eq!(state.quests[0].completed_instances.len(), 1);
            assert_eq!(state.quests[0].status, QuestStatus::Completed);
        }

        it "leaves non-daily quests alone" {
            let mut state = ProgressState::default();
            let quest = reducer::add_quest(&mut state, quest_input("Side project", 10));
            reducer::complete_quest(&mut state, quest.id, day("2024-01-01"), chrono::Utc::now()).unwrap();

            reducer::refresh_daily_quests(&mut state, day("2024-01-02"));

            assert_eq!(state.quests[0].completed_instances.len(), 1);
        }
    }

    describe "force refresh" {
        it "re-seeds dailies and preserves everything else" {
            let custom = store.add_quest(quest_input("My habit", 10));
            let old_daily_ids: Vec<_> = store.quests_by_type(QuestType::Daily)
                .iter().map(|q| q.id).collect();

            store.force_refresh_daily_quests();

            let dailies = store.quests_by_type(QuestType::Daily);
            assert_eq!(dailies.len(), 5);
            assert!(dailies.iter().all(|q| !old_daily_ids.contains(&q.id)));
            assert!(store.quest(custom.id).is_some());
            assert_eq!(store.quests_by_type(QuestType::Weekly).len(), 1);
        }
    }

    describe "reset_progress" {
        it "restores factory defaults" {
            let quest = store.add_quest(quest_input("Temp", 500));
            store.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            assert!(store.character().level > 1);

            store.reset_progress();

            assert_eq!(store.character(), &defaults::default_character());
            assert_eq!(store.quests().len(), 7);
            assert!(store.quest(quest.id).is_none());
        }
    }

    describe "persistence" {
        it "round-trips the snapshot field for field" {
            let quest = store.add_quest(CreateQuestInput {
                stat_boosts: StatBoosts::spirit(1),
                max_completions: Some(3),
                ..quest_input("Breathe", 15)
            });
            store.complete_quest(quest.id, Some(today())).unwrap();
            store.fail_quest(quest.id, Some(today())).unwrap();

            let character = store.character().clone();
            let quests = store.quests().to_vec();

            let mut reloaded = ProgressStore::new(Arc::new(storage.clone()));
            reloaded.initialize("u1");

            assert_eq!(reloaded.character(), &character);
            assert_eq!(reloaded.quests(), &quests[..]);
        }

        it "namespaces snapshots per user" {
            let quest = store.add_quest(quest_input("Mine", 10));

            let mut other = ProgressStore::new(Arc::new(storage.clone()));
            other.initialize("u2");

            assert!(other.quest(quest.id).is_none());
            assert_eq!(other.character().xp, 0);

            let ns1 = Namespace::for_user("u1");
            let ns2 = Namespace::for_user("u2");
            assert_ne!(ns1.quests_key(), ns2.quests_key());
            assert!(storage.get(&ns1.quests_key()).unwrap().is_some());
            assert!(storage.get(&ns2.quests_key()).unwrap().is_some());
        }

        it "is idempotent for the same user id" {
            let quest = store.add_quest(quest_input("Once", 10));
            store.initialize("u1");
            assert!(store.quest(quest.id).is_some());
            assert_eq!(store.quests().len(), 8);
        }

        it "falls back to defaults on a corrupt snapshot" {
            let ns = Namespace::for_user("corrupt");
            storage.set(&ns.character_key(), "{not json").unwrap();
            storage.set(&ns.quests_key(), "[broken").unwrap();

            let mut recovered = ProgressStore::new(Arc::new(storage.clone()));
            recovered.initialize("corrupt");

            assert_eq!(recovered.character().level, 1);
            assert_eq!(recovered.quests().len(), 7);
        }

        it "round-trips through the sqlite backend" {
            let sqlite = SqliteStore::open_memory().expect("Failed to open in-memory storage");
            sqlite.migrate().expect("Failed to migrate");
            let sqlite = Arc::new(sqlite);

            let mut first = ProgressStore::new(sqlite.clone());
            first.initialize("u1");
            let quest = first.add_quest(quest_input("Persisted", 25));
            first.complete_quest(quest.id, Some(today())).unwrap();
            let character = first.character().clone();
            let quests = first.quests().to_vec();

            let mut reloaded = ProgressStore::new(sqlite);
            reloaded.initialize("u1");

            assert_eq!(reloaded.character(), &character);
            assert_eq!(reloaded.quests(), &quests[..]);
        }

        it "keeps working in memory before initialization" {
            let fresh_storage = MemoryStore::new();
            let mut uninitialized = ProgressStore::new(Arc::new(fresh_storage.clone()));

            let quest = uninitialized.add_quest(quest_input("Ephemeral", 10));
            uninitialized.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();

            assert_eq!(uninitialized.character().xp, 10);
            assert!(!uninitialized.is_initialized());
            // nothing was persisted without a user namespace
            assert!(fresh_storage
                .get(&Namespace::for_user("u1").quests_key())
                .unwrap()
                .is_none());
        }
    }

    describe "update_character" {
        it "keeps the threshold positive for extreme levels" {
            store.update_character(UpdateCharacterInput {
                level: Some(3_000_000_000),
                ..Default::default()
            });
            assert!(store.character().xp_to_next_level >= 1);

            // awarding xp at this level must terminate, not grind on a
            // zero threshold
            let quest = store.add_quest(quest_input("Grind", 50));
            store.complete_quest(quest.id, Some(day("2024-01-01"))).unwrap();
            assert_eq!(store.character().level, 3_000_000_000);
            assert!(store.character().xp_to_next_level >= 1);
        }

        it "applies partial updates and re-derives the threshold" {
            store.update_character(UpdateCharacterInput {
                level: Some(3),
                streak: Some(9),
                ..Default::default()
            });

            assert_eq!(store.character().level, 3);
            assert_eq!(store.character().xp_to_next_level, 144);
            assert_eq!(store.character().streak, 9);
            assert_eq!(store.character().xp, 0);
        }
    }

    describe "quests_by_type" {
        it "filters in collection order" {
            store.add_quest(CreateQuestInput {
                quest_type: QuestType::Custom,
                ..quest_input("First custom", 1)
            });
            store.add_quest(CreateQuestInput {
                quest_type: QuestType::Custom,
                ..quest_input("Second custom", 1)
            });

            let customs = store.quests_by_type(QuestType::Custom);
            assert_eq!(customs.len(), 2);
            assert_eq!(customs[0].title, "First custom");
            assert_eq!(customs[1].title, "Second custom");
        }
    }
}
