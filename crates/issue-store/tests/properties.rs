//! Property-based tests for the store's view, rollback and ranking rules.

use issue_store::filter;
use issue_store::{
    Issue, IssueFilter, IssueStore, IssueTable, IssueUpdate, Priority, RemoteError, Status,
    StoreConfig, ViewMode,
};
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Backlog),
        Just(Status::Todo),
        Just(Status::InProgress),
        Just(Status::Done),
        Just(Status::Canceled),
        "[a-z]{2,6}".prop_map(Status::Custom),
    ]
}

fn issue_strategy() -> impl Strategy<Value = Issue> {
    (
        "[a-z0-9]{1,6}",
        "[A-Za-z ]{0,20}",
        status_strategy(),
        0i32..=4,
        prop::option::of(prop::sample::select(vec!["ana", "bo", "cy"])),
        -1.0e6f64..1.0e6,
    )
        .prop_map(|(id, title, status, priority, assignee, rank)| Issue {
            id: format!("ENG-{id}"),
            team_id: "ENG".to_string(),
            title,
            status,
            priority: Priority(priority),
            assignee: assignee.map(str::to_string),
            rank,
            ..Default::default()
        })
}

fn update_strategy() -> impl Strategy<Value = IssueUpdate> {
    (
        prop::option::of("[a-z]{1,10}"),
        prop::option::of(prop::option::of("[a-z ]{0,20}")),
        prop::option::of(status_strategy()),
        prop::option::of((0i32..=4).prop_map(Priority)),
        prop::option::of(prop::option::of("[a-z]{2,4}")),
        prop::option::of(-1.0e6f64..1.0e6),
    )
        .prop_map(
            |(title, description, status, priority, assignee, rank)| IssueUpdate {
                title,
                description,
                status,
                priority,
                assignee,
                rank,
                ..Default::default()
            },
        )
}

fn filter_strategy() -> impl Strategy<Value = IssueFilter> {
    (
        prop::option::of(prop::collection::vec(status_strategy(), 0..3)),
        prop::option::of(prop::collection::vec((0i32..=4).prop_map(Priority), 0..3)),
        prop::option::of("[a-z]{0,2}"),
    )
        .prop_map(|(statuses, priorities, search)| IssueFilter {
            statuses,
            priorities,
            search,
            ..Default::default()
        })
}

fn group_ids(store: &IssueStore, status: &Status) -> Vec<String> {
    store
        .read()
        .group(status)
        .iter()
        .map(|i| i.id.clone())
        .collect()
}

proptest! {
    #[test]
    fn empty_filter_returns_whole_table(issues in prop::collection::vec(issue_strategy(), 0..30)) {
        let table = IssueTable::from_issues(issues);
        let mut seen: Vec<&str> = filter::apply(&table, &IssueFilter::default(), ViewMode::Board)
            .into_iter()
            .map(|i| i.id.as_str())
            .collect();
        let mut all: Vec<&str> = table.values().map(|i| i.id.as_str()).collect();
        seen.sort_unstable();
        all.sort_unstable();
        prop_assert_eq!(seen, all);
    }

    #[test]
    fn filter_output_is_deterministic(
        issues in prop::collection::vec(issue_strategy(), 0..30),
        filter in filter_strategy(),
    ) {
        let table = IssueTable::from_issues(issues);
        let first = filter::apply(&table, &filter, ViewMode::Board);
        let second = filter::apply(&table, &filter, ViewMode::Board);
        prop_assert_eq!(&first, &second);

        for pair in first.windows(2) {
            let ordered = pair[0].status < pair[1].status
                || (pair[0].status == pair[1].status && pair[0].cmp_rank(pair[1]).is_le());
            prop_assert!(ordered, "{} before {}", pair[0].id, pair[1].id);
        }
    }

    #[test]
    fn failed_mutation_restores_snapshot(
        issue in issue_strategy(),
        update in update_strategy(),
    ) {
        let id = issue.id.clone();
        let mut store = IssueStore::with_issues(StoreConfig::default(), [issue.clone()]).unwrap();
        let ticket = store.mutate(&id, update).unwrap();
        let result = store.resolve(ticket.mutation, Err(RemoteError::network("down")));
        prop_assert!(result.is_err());
        prop_assert_eq!(store.get(&id).unwrap(), &issue);
        prop_assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn failures_in_any_order_restore_original(
        issue in issue_strategy(),
        updates in prop::collection::vec(update_strategy(), 1..6),
        order in prop::collection::vec(any::<prop::sample::Index>(), 6),
    ) {
        let id = issue.id.clone();
        let mut store = IssueStore::with_issues(StoreConfig::default(), [issue.clone()]).unwrap();
        let mut tickets: Vec<u64> = updates
            .into_iter()
            .map(|u| store.mutate(&id, u).unwrap().mutation)
            .collect();

        let mut picks = order.into_iter();
        while !tickets.is_empty() {
            let k = picks.next().map_or(0, |p| p.index(tickets.len()));
            let mutation = tickets.remove(k);
            let _ = store.resolve(mutation, Err(RemoteError::rejected("no")));
        }
        prop_assert_eq!(store.get(&id).unwrap(), &issue);
    }

    #[test]
    fn move_between_neighbours_lands_strictly_between(
        left in -1.0e9f64..1.0e9,
        gap in 1.0e-3f64..1.0e6,
    ) {
        let right = left + gap;
        let mut store = IssueStore::with_issues(
            StoreConfig::default(),
            [
                Issue { id: "ENG-a".into(), status: Status::Todo, rank: left, ..Default::default() },
                Issue { id: "ENG-b".into(), status: Status::Todo, rank: right, ..Default::default() },
                Issue { id: "ENG-c".into(), status: Status::Backlog, rank: 0.0, ..Default::default() },
            ],
        )
        .unwrap();

        let tickets = store.move_issue("ENG-c", &Status::Todo, 1).unwrap().unwrap();
        prop_assert!(tickets.reindex.is_empty());
        let rank = store.get("ENG-c").unwrap().rank;
        prop_assert!(left < rank && rank < right);
        prop_assert_eq!(group_ids(&store, &Status::Todo), vec!["ENG-a", "ENG-c", "ENG-b"]);

        let version = store.version();
        prop_assert!(store.move_issue("ENG-c", &Status::Todo, 1).unwrap().is_none());
        prop_assert_eq!(store.version(), version);
    }

    #[test]
    fn insertions_keep_requested_order(indices in prop::collection::vec(0usize..8, 1..120)) {
        let config = StoreConfig::default();
        let mut store = IssueStore::new(config.clone()).unwrap();
        let mut expected: Vec<String> = Vec::new();

        for (n, index) in indices.into_iter().enumerate() {
            let id = format!("ENG-{n:03}");
            store.insert(Issue { id: id.clone(), status: Status::Backlog, ..Default::default() });

            let before: Vec<f64> = store.read().group(&Status::Todo).iter().map(|i| i.rank).collect();
            let slot = index.min(expected.len());
            let tickets = store.move_issue(&id, &Status::Todo, slot).unwrap().unwrap();
            expected.insert(slot, id);

            if !tickets.reindex.is_empty() {
                // Only when the target neighbours could no longer be split
                let left = slot.checked_sub(1).map(|k| before[k]);
                let right = before.get(slot).copied();
                if let (Some(l), Some(r)) = (left, right) {
                    let mid = l + (r - l) / 2.0;
                    prop_assert!(r - l < config.min_rank_gap || !(l < mid && mid < r));
                } else {
                    prop_assert!(false, "re-index at an open end");
                }
            }

            prop_assert_eq!(&group_ids(&store, &Status::Todo), &expected);
            let ranks: Vec<f64> = store.read().group(&Status::Todo).iter().map(|i| i.rank).collect();
            prop_assert!(ranks.windows(2).all(|w| w[0] < w[1]), "ranks not strictly increasing");
        }
    }
}
