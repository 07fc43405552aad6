//! Library persistence tests: relations, cascades and reopening.

use research_shelf::Library;
use research_shelf::error::LibraryError;
use research_shelf::models::{NewPaper, NewTag};

fn paper(id: &str, title: &str) -> NewPaper {
    NewPaper {
        id: id.to_string(),
        title: title.to_string(),
        authors: vec!["Grace Hopper".into()],
        year: Some(1952),
        journal: Some("ACM".into()),
        pages: Some("1-10".into()),
        url: Some(format!("https://openalex.org/{id}")),
        ..Default::default()
    }
}

fn tag(name: &str) -> NewTag {
    NewTag { id: None, name: name.to_string(), color: None }
}

// =============================================================================
// Relations
// =============================================================================

#[test]
fn test_papers_carry_tags_and_note() {
    let library = Library::open_in_memory().unwrap();
    library.create_paper(&paper("W1", "Compilers")).unwrap();
    library.create_paper(&paper("W2", "Debugging")).unwrap();

    let to_read = library.create_tag(&tag("to-read")).unwrap();
    let classic = library.create_tag(&tag("classic")).unwrap();
    library.tag_paper("W1", &to_read.id).unwrap();
    library.tag_paper("W1", &classic.id).unwrap();
    library.save_note("W1", "Seminal").unwrap();

    let papers = library.list_papers().unwrap();
    assert_eq!(papers.len(), 2);

    let first = &papers[0];
    assert_eq!(first.id, "W1");
    assert_eq!(first.tag_names(), vec!["classic", "to-read"]);
    assert_eq!(first.note_content(), "Seminal");

    let second = &papers[1];
    assert!(second.tags.is_empty());
    assert!(second.note.is_none());
}

#[test]
fn test_deleting_paper_cascades() {
    let library = Library::open_in_memory().unwrap();
    library.create_paper(&paper("W1", "Compilers")).unwrap();
    let to_read = library.create_tag(&tag("to-read")).unwrap();
    library.tag_paper("W1", &to_read.id).unwrap();
    library.save_note("W1", "Seminal").unwrap();

    let deleted = library.delete_paper("W1").unwrap();
    assert_eq!(deleted.note_content(), "Seminal");

    assert!(library.get_paper("W1").unwrap().is_none());
    assert!(library.tags_for_paper("W1").unwrap().is_empty());
    assert_eq!(library.get_note("W1").unwrap().content, "");
    // The tag itself survives.
    assert_eq!(library.list_tags().unwrap().len(), 1);
}

#[test]
fn test_untag_requires_existing_ids() {
    let library = Library::open_in_memory().unwrap();
    library.create_paper(&paper("W1", "Compilers")).unwrap();
    let to_read = library.create_tag(&tag("to-read")).unwrap();

    // Unlinking a pair that was never linked is fine.
    library.untag_paper("W1", &to_read.id).unwrap();

    assert!(matches!(
        library.untag_paper("W9", &to_read.id),
        Err(LibraryError::NotFound { entity: "Paper", .. })
    ));
    assert!(matches!(
        library.untag_paper("W1", "t9"),
        Err(LibraryError::NotFound { entity: "Tag", .. })
    ));
}

#[test]
fn test_duplicate_tag_id_is_rejected() {
    let library = Library::open_in_memory().unwrap();
    let first = NewTag { id: Some("t1".into()), name: "a".into(), color: None };
    let second = NewTag { id: Some("t1".into()), name: "b".into(), color: None };

    library.create_tag(&first).unwrap();
    assert!(matches!(library.create_tag(&second), Err(LibraryError::Duplicate { .. })));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_library_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.db");

    {
        let library = Library::open(&path).unwrap();
        library.create_paper(&paper("https://openalex.org/W1", "Compilers")).unwrap();
        library.save_note("https://openalex.org/W1", "line one\nline two").unwrap();
    }

    let library = Library::open(&path).unwrap();
    let saved = library.get_paper("https://openalex.org/W1").unwrap().unwrap();
    assert_eq!(saved.title, "Compilers");
    assert_eq!(saved.authors, vec!["Grace Hopper"]);
    assert_eq!(saved.pages.as_deref(), Some("1-10"));
    assert_eq!(saved.note_content(), "line one\nline two");
}
