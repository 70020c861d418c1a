use chrono::Days;
use reading_core::model::{
    BookDraft, BookId, BookStatus, Goal, GoalId, GoalType, ReadingList,
};
use reading_core::time::{fixed_now, fixed_today};
use storage::repository::{
    BookRepository, GenreRepository, GoalRepository, ListRepository, NewBookRecord,
    NewGenreRecord, NewGoalRecord, NewListRecord, NewSessionRecord, SessionRepository,
    StorageError,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn full_book_record() -> NewBookRecord {
    let book = BookDraft::new("The Master and Margarita", "Mikhail Bulgakov")
        .with_total_pages(384)
        .with_publication_year(1967)
        .with_cover_url("https://covers.example/master.jpg")
        .with_isbn("9780141180144")
        .with_description("The devil visits Soviet Moscow.")
        .with_rating(5)
        .build(BookId::new(0), fixed_now())
        .unwrap();
    NewBookRecord::from_book(&book)
}

#[tokio::test]
async fn book_roundtrip_preserves_every_field() {
    let repo = connect("memdb_book_roundtrip").await;

    let id = repo.insert_new_book(full_book_record()).await.unwrap();
    let book = repo.get_book(id).await.unwrap().expect("book exists");

    assert_eq!(book.title(), "The Master and Margarita");
    assert_eq!(book.author(), "Mikhail Bulgakov");
    assert_eq!(book.publication_year(), Some(1967));
    assert_eq!(book.total_pages(), 384);
    assert_eq!(book.cover_url(), Some("https://covers.example/master.jpg"));
    assert_eq!(book.isbn(), Some("9780141180144"));
    assert_eq!(book.description(), Some("The devil visits Soviet Moscow."));
    assert_eq!(book.personal_rating(), Some(5));
    assert_eq!(book.status(), BookStatus::NotStarted);
    assert_eq!(book.current_page(), 0);
    assert_eq!(book.created_at(), fixed_now());
}

#[tokio::test]
async fn log_reading_commits_session_and_book_atomically() {
    let repo = connect("memdb_log_reading").await;
    let id = repo.insert_new_book(full_book_record()).await.unwrap();

    let mut book = repo.get_book(id).await.unwrap().unwrap();
    book.apply_session(60, fixed_now());

    let session_id = repo
        .log_reading(
            NewSessionRecord {
                book_id: id,
                session_date: fixed_today(),
                pages_read: 60,
                start_page: Some(0),
                end_page: Some(60),
                duration_minutes: 45,
                notes: Some("opening chapters".into()),
                created_at: fixed_now(),
            },
            &book,
        )
        .await
        .unwrap();

    let stored = repo.get_book(id).await.unwrap().unwrap();
    assert_eq!(stored.current_page(), 60);
    assert_eq!(stored.status(), BookStatus::InProgress);
    assert_eq!(stored.started_at(), Some(fixed_now()));

    let sessions = repo.sessions_for_book(id).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id(), session_id);
    assert_eq!(sessions[0].pages_read(), 60);
    assert_eq!(sessions[0].end_page(), Some(60));
    assert_eq!(sessions[0].notes(), Some("opening chapters"));
}

#[tokio::test]
async fn log_reading_against_missing_book_leaves_no_session_row() {
    let repo = connect("memdb_log_missing").await;

    let ghost = BookDraft::new("Ghost", "Nobody")
        .build(BookId::new(4242), fixed_now())
        .unwrap();
    let err = repo
        .log_reading(
            NewSessionRecord {
                book_id: BookId::new(4242),
                session_date: fixed_today(),
                pages_read: 10,
                start_page: None,
                end_page: None,
                duration_minutes: 10,
                notes: None,
                created_at: fixed_now(),
            },
            &ghost,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::NotFound));
    assert!(repo.list_sessions(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn sessions_in_range_is_inclusive_on_both_ends() {
    let repo = connect("memdb_session_range").await;
    let id = repo.insert_new_book(full_book_record()).await.unwrap();
    let mut book = repo.get_book(id).await.unwrap().unwrap();

    for days_ago in [3_u64, 2, 1, 0] {
        book.apply_session(10, fixed_now());
        repo.log_reading(
            NewSessionRecord {
                book_id: id,
                session_date: fixed_today() - Days::new(days_ago),
                pages_read: 10,
                start_page: None,
                end_page: None,
                duration_minutes: 15,
                notes: None,
                created_at: fixed_now(),
            },
            &book,
        )
        .await
        .unwrap();
    }

    let from = fixed_today() - Days::new(2);
    let sessions = repo.sessions_in_range(from, fixed_today()).await.unwrap();
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0].session_date(), from);
    assert_eq!(sessions[2].session_date(), fixed_today());
}

#[tokio::test]
async fn deleting_a_book_cascades_to_its_sessions() {
    let repo = connect("memdb_book_cascade").await;
    let id = repo.insert_new_book(full_book_record()).await.unwrap();
    let mut book = repo.get_book(id).await.unwrap().unwrap();
    book.apply_session(20, fixed_now());
    repo.log_reading(
        NewSessionRecord {
            book_id: id,
            session_date: fixed_today(),
            pages_read: 20,
            start_page: None,
            end_page: None,
            duration_minutes: 20,
            notes: None,
            created_at: fixed_now(),
        },
        &book,
    )
    .await
    .unwrap();

    repo.delete_book(id).await.unwrap();
    assert!(repo.get_book(id).await.unwrap().is_none());
    assert!(repo.list_sessions(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_genre_unshelves_its_books() {
    let repo = connect("memdb_genre_null").await;
    let genre_id = repo
        .insert_new_genre(NewGenreRecord {
            name: "Fantasy".into(),
            color: "#8b5cf6".into(),
            is_default: false,
            created_at: fixed_now(),
        })
        .await
        .unwrap();

    let mut record = full_book_record();
    record.genre_id = Some(genre_id);
    let book_id = repo.insert_new_book(record).await.unwrap();

    repo.delete_genre(genre_id).await.unwrap();
    let book = repo.get_book(book_id).await.unwrap().unwrap();
    assert_eq!(book.genre_id(), None);
}

#[tokio::test]
async fn goal_type_codec_survives_the_database() {
    let repo = connect("memdb_goal_codec").await;

    for goal_type in [
        GoalType::DailyPages,
        GoalType::MonthlyBooks,
        GoalType::YearlyBooks,
    ] {
        let goal = Goal::starting(GoalId::new(0), goal_type, 12, fixed_today(), fixed_now())
            .unwrap();
        let id = repo
            .insert_new_goal(NewGoalRecord::from_goal(&goal))
            .await
            .unwrap();
        let stored = repo.get_goal(id).await.unwrap().expect("goal exists");
        assert_eq!(stored.goal_type(), goal_type);
        assert_eq!(stored.target_value(), 12);
        assert_eq!(stored.period_start(), goal.period_start());
        assert_eq!(stored.period_end(), goal.period_end());
        assert!(stored.is_active());
    }

    assert_eq!(repo.list_active_goals().await.unwrap().len(), 3);
}

#[tokio::test]
async fn deactivated_goals_drop_out_of_the_active_list() {
    let repo = connect("memdb_goal_active").await;
    let goal = Goal::starting(
        GoalId::new(0),
        GoalType::DailyPages,
        30,
        fixed_today(),
        fixed_now(),
    )
    .unwrap();
    let id = repo
        .insert_new_goal(NewGoalRecord::from_goal(&goal))
        .await
        .unwrap();

    repo.set_goal_active(id, false).await.unwrap();
    assert!(repo.list_active_goals().await.unwrap().is_empty());
    assert!(!repo.get_goal(id).await.unwrap().unwrap().is_active());
}

#[tokio::test]
async fn list_membership_roundtrip_and_conflicts() {
    let repo = connect("memdb_lists").await;
    let book_id = repo.insert_new_book(full_book_record()).await.unwrap();

    let list = ReadingList::new(
        reading_core::model::ListId::new(0),
        "Favorites",
        Some("the shelf of honor".into()),
        "#8b5cf6",
        fixed_now(),
    )
    .unwrap();
    let list_id = repo
        .insert_new_list(NewListRecord::from_list(&list))
        .await
        .unwrap();

    repo.add_book_to_list(list_id, book_id).await.unwrap();
    let err = repo.add_book_to_list(list_id, book_id).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    assert_eq!(repo.books_in_list(list_id).await.unwrap(), vec![book_id]);

    repo.remove_book_from_list(list_id, book_id).await.unwrap();
    assert!(repo.books_in_list(list_id).await.unwrap().is_empty());

    let err = repo
        .remove_book_from_list(list_id, book_id)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn adding_a_missing_book_to_a_list_is_not_found() {
    let repo = connect("memdb_list_fk").await;
    let list = ReadingList::new(
        reading_core::model::ListId::new(0),
        "Loans",
        None,
        "#10b981",
        fixed_now(),
    )
    .unwrap();
    let list_id = repo
        .insert_new_list(NewListRecord::from_list(&list))
        .await
        .unwrap();

    let err = repo
        .add_book_to_list(list_id, BookId::new(999))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
