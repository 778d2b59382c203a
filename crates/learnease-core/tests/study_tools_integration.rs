//! Integration tests for the study tools sharing one on-disk store.

use chrono::NaiveDate;
use learnease_core::stats::{BADGE_FIRST_SESSION, BADGE_THOUSAND_WORDS};
use learnease_core::{Database, FocusBlocker, Journal, StickyNotes, StudyStats};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

#[test]
fn test_tools_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("learnease.db");

    {
        let db = Database::open_at(&path).unwrap();
        Journal::new(&db).add("Notes on ownership and borrowing.", date(4)).unwrap();
        StickyNotes::new(&db).add("revise lifetimes", None).unwrap();
        let blocker = FocusBlocker::new(&db);
        blocker.set_active(true).unwrap();
        blocker.add_site("news.ycombinator.com").unwrap();
        StudyStats::new(&db).record_focus(date(4), 25).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    assert_eq!(Journal::new(&db).entries().unwrap().len(), 1);
    assert_eq!(StickyNotes::new(&db).list().unwrap()[0].text, "revise lifetimes");
    assert!(FocusBlocker::new(&db)
        .is_blocked("https://news.ycombinator.com/newest")
        .unwrap());

    let summary = StudyStats::new(&db).summary(date(4)).unwrap();
    assert_eq!(summary.weekly_stats[0].words, 5);
    assert_eq!(summary.streak, 1);
    assert_eq!(summary.badges, vec![BADGE_FIRST_SESSION.to_string()]);
}

#[test]
fn test_journal_words_earn_the_word_badge() {
    let db = Database::open_memory().unwrap();
    let journal = Journal::new(&db);
    let essay = "word ".repeat(600);
    journal.add(&essay, date(5)).unwrap();
    journal.add(&essay, date(6)).unwrap();

    let stats = StudyStats::new(&db);
    assert!(stats.badges().unwrap().contains(&BADGE_THOUSAND_WORDS.to_string()));
    assert_eq!(stats.streak().unwrap(), 2);
}
