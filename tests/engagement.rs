//! Story publishing and engagement through the facade

use storyhive::{Error, Storyhive, StoryId, UserId, Value};

fn uid(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

fn sid(s: &str) -> StoryId {
    StoryId::new(s).unwrap()
}

fn seeded() -> Storyhive {
    let hive = Storyhive::ephemeral();
    hive.create_user(&uid("author"), "author", "au@example.com").unwrap();
    hive.create_user(&uid("reader"), "reader", "r@example.com").unwrap();
    hive.publish_story(&uid("author"), &sid("s1"), "A Tale", "Once upon a time", None)
        .unwrap();
    hive
}

#[test]
fn like_toggle_moves_count_and_list_together() {
    let hive = seeded();

    assert!(hive.engagement().toggle_like(&uid("reader"), &sid("s1")).unwrap());
    let story = hive
        .store()
        .get(&storyhive::DocPath::parse("stories/s1").unwrap())
        .unwrap();
    assert_eq!(story.field("likes"), Some(&Value::Int(1)));

    assert!(!hive.engagement().toggle_like(&uid("reader"), &sid("s1")).unwrap());
    let story = hive
        .store()
        .get(&storyhive::DocPath::parse("stories/s1").unwrap())
        .unwrap();
    assert_eq!(story.field("likes"), Some(&Value::Int(0)));
    hive.shutdown();
}

#[test]
fn save_toggle_tracks_reading_list() {
    let hive = seeded();
    hive.publish_story(&uid("author"), &sid("s2"), "Another", "text", Some("t.png"))
        .unwrap();

    hive.engagement().toggle_save(&uid("reader"), &sid("s1")).unwrap();
    hive.engagement().toggle_save(&uid("reader"), &sid("s2")).unwrap();
    hive.engagement().toggle_save(&uid("reader"), &sid("s1")).unwrap();

    let reader = hive
        .store()
        .get(&storyhive::DocPath::parse("users/reader").unwrap())
        .unwrap();
    assert_eq!(
        reader.field("savedStories"),
        Some(&Value::Array(vec![Value::from("s2")]))
    );
    hive.shutdown();
}

#[test]
fn ratings_average_and_replace() {
    let hive = seeded();

    hive.engagement().rate(&uid("reader"), &sid("s1"), 5).unwrap();
    hive.engagement().rate(&uid("author"), &sid("s1"), 2).unwrap();
    assert_eq!(hive.engagement().average_rating(&sid("s1")).unwrap(), Some(3.5));

    // Re-rating replaces, not appends
    hive.engagement().rate(&uid("reader"), &sid("s1"), 3).unwrap();
    assert_eq!(hive.engagement().average_rating(&sid("s1")).unwrap(), Some(2.5));

    assert!(matches!(
        hive.engagement().rate(&uid("reader"), &sid("s1"), 9),
        Err(Error::InvalidOperation(_))
    ));
    hive.shutdown();
}

#[test]
fn comments_are_listed_newest_first() {
    let hive = seeded();

    hive.engagement()
        .add_comment(&uid("reader"), "reader", &sid("s1"), "loved it")
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    hive.engagement()
        .add_comment(&uid("author"), "author", &sid("s1"), "thanks!")
        .unwrap();

    let comments = hive.engagement().comments(&sid("s1")).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "thanks!");
    assert_eq!(comments[0].author_id, "author");
    assert_eq!(comments[1].text, "loved it");
    hive.shutdown();
}

#[test]
fn engagement_leaves_follow_counters_alone() {
    // Field-level isolation: likes and saves never touch the counter pair
    let hive = seeded();

    hive.engagement().toggle_like(&uid("reader"), &sid("s1")).unwrap();
    hive.engagement().toggle_save(&uid("reader"), &sid("s1")).unwrap();
    hive.drain();

    let stats = hive.follows().stats(&uid("reader")).unwrap();
    assert_eq!(stats.followers_count, 0);
    assert_eq!(stats.following_count, 0);
    hive.shutdown();
}
