mod common;

use chrono::NaiveDate;
use library_api::application::book::{
    BookApplicationError, create_book, delete_book, find_books, get_book_by_id, get_book_by_isbn,
    update_book,
};
use library_api::application::loan::save_loan;
use library_api::domain::commands::CreateBook;
use library_api::domain::{Book, BookFilter, BookId, IdentityError, PageRequest, loan::open_loan};

fn create_cmd(title: &str, author: &str, isbn: &str) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        author: author.to_string(),
        isbn: isbn.to_string(),
    }
}

// ============================================================================
// 登録
// ============================================================================

#[tokio::test]
async fn test_create_book_assigns_id() {
    let (deps, _, _) = common::in_memory_deps();

    let book = create_book(&deps, create_cmd("Meu Livro", "Moises", "123456"))
        .await
        .unwrap();

    assert!(book.id.is_some());
    assert_eq!(book.title, "Meu Livro");
    assert_eq!(book.author, "Moises");
    assert_eq!(book.isbn, "123456");
}

#[tokio::test]
async fn test_create_book_rejects_duplicate_isbn() {
    let (deps, store, _) = common::in_memory_deps();

    // Arrange: ISBNの異なる2冊は登録できる
    create_book(&deps, create_cmd("Livro A", "Autor A", "111"))
        .await
        .unwrap();
    create_book(&deps, create_cmd("Livro B", "Autor B", "222"))
        .await
        .unwrap();

    // Act: 1冊目と同じISBNで登録
    let result = create_book(&deps, create_cmd("Livro C", "Autor C", "111")).await;

    // Assert
    assert!(matches!(result, Err(BookApplicationError::DuplicateIsbn)));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Isbn already registered."
    );
    assert_eq!(store.book_count(), 2);
}

#[tokio::test]
async fn test_conditional_insert_rejects_isbn_that_passed_existence_check() {
    // 存在確認の後に同じISBNが登録された状況
    let (deps, store) = common::stale_check_deps();
    create_book(&deps, create_cmd("Livro A", "Autor A", "111"))
        .await
        .unwrap();

    let result = create_book(&deps, create_cmd("Livro B", "Autor B", "111")).await;

    assert!(matches!(result, Err(BookApplicationError::DuplicateIsbn)));
    assert_eq!(store.book_count(), 1);
}

#[tokio::test]
async fn test_create_book_trims_fields() {
    let (deps, _, _) = common::in_memory_deps();

    let book = create_book(&deps, create_cmd(" Meu Livro ", " Moises", "123 "))
        .await
        .unwrap();

    assert_eq!(book.title, "Meu Livro");
    assert_eq!(book.author, "Moises");
    assert_eq!(get_book_by_isbn(&deps, "123").await.unwrap(), Some(book));
}

// ============================================================================
// 取得
// ============================================================================

#[tokio::test]
async fn test_get_book_by_id_returns_none_when_missing() {
    let (deps, _, _) = common::in_memory_deps();

    let result = get_book_by_id(&deps, BookId::new(999)).await.unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_get_book_by_id_and_isbn() {
    let (deps, _, _) = common::in_memory_deps();
    let saved = create_book(&deps, create_cmd("Meu Livro", "Moises", "123"))
        .await
        .unwrap();

    let by_id = get_book_by_id(&deps, saved.id.unwrap()).await.unwrap();
    let by_isbn = get_book_by_isbn(&deps, "123").await.unwrap();
    let missing = get_book_by_isbn(&deps, "999").await.unwrap();

    assert_eq!(by_id, Some(saved.clone()));
    assert_eq!(by_isbn, Some(saved));
    assert!(missing.is_none());
}

// ============================================================================
// 更新・削除
// ============================================================================

#[tokio::test]
async fn test_update_book_without_id_is_invalid_argument() {
    let (deps, _, _) = common::in_memory_deps();

    let result = update_book(&deps, Book::new("Title", "Author", "123")).await;

    assert!(matches!(
        result,
        Err(BookApplicationError::InvalidArgument(
            IdentityError::BookIdMissing
        ))
    ));
}

#[tokio::test]
async fn test_update_book_overwrites_title_and_author_only() {
    let (deps, _, _) = common::in_memory_deps();
    let saved = create_book(&deps, create_cmd("Old", "Someone", "123"))
        .await
        .unwrap();

    let updated = update_book(
        &deps,
        Book {
            title: "New".to_string(),
            author: "Other".to_string(),
            isbn: "changed".to_string(),
            ..saved.clone()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.title, "New");
    assert_eq!(updated.author, "Other");
    assert_eq!(updated.isbn, "123");
}

#[tokio::test]
async fn test_update_missing_book_is_not_found() {
    let (deps, _, _) = common::in_memory_deps();
    let ghost = Book {
        id: Some(BookId::new(42)),
        ..Book::new("Title", "Author", "123")
    };

    let result = update_book(&deps, ghost).await;

    assert!(matches!(result, Err(BookApplicationError::BookNotFound)));
}

#[tokio::test]
async fn test_delete_book_without_id_is_invalid_argument() {
    let (deps, _, _) = common::in_memory_deps();

    let result = delete_book(&deps, &Book::new("Title", "Author", "123")).await;

    assert!(matches!(
        result,
        Err(BookApplicationError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_delete_book() {
    let (deps, store, _) = common::in_memory_deps();
    let saved = create_book(&deps, create_cmd("Meu Livro", "Moises", "123"))
        .await
        .unwrap();

    delete_book(&deps, &saved).await.unwrap();

    assert_eq!(store.book_count(), 0);
    assert!(get_book_by_id(&deps, saved.id.unwrap()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_book_with_loans_is_rejected() {
    let (deps, store, _) = common::in_memory_deps();
    let saved = create_book(&deps, create_cmd("Meu Livro", "Moises", "123"))
        .await
        .unwrap();
    let loan_date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    save_loan(
        &deps,
        open_loan(saved.clone(), "Fulano".to_string(), None, loan_date),
    )
    .await
    .unwrap();

    let result = delete_book(&deps, &saved).await;

    assert!(matches!(result, Err(BookApplicationError::BookHasLoans)));
    assert_eq!(store.book_count(), 1);
}

// ============================================================================
// 検索
// ============================================================================

#[tokio::test]
async fn test_find_books_partial_case_insensitive_ignoring_empty_fields() {
    let (deps, _, _) = common::in_memory_deps();
    create_book(&deps, create_cmd("Meu Livro", "Moises", "1"))
        .await
        .unwrap();
    create_book(&deps, create_cmd("O MEU caderno", "Outra Pessoa", "2"))
        .await
        .unwrap();
    create_book(&deps, create_cmd("Seu Livro", "Moises", "3"))
        .await
        .unwrap();

    let filter = BookFilter {
        title: Some("Meu".to_string()),
        author: Some(String::new()),
        isbn: None,
    };
    let page = find_books(&deps, &filter, PageRequest::new(0, 10))
        .await
        .unwrap();

    assert_eq!(page.total_elements, 2);
    let isbns: Vec<&str> = page.content.iter().map(|b| b.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["1", "2"]);
}

#[tokio::test]
async fn test_find_books_paginates_and_reports_total() {
    let (deps, _, _) = common::in_memory_deps();
    for i in 0..5 {
        create_book(&deps, create_cmd(&format!("Livro {i}"), "Moises", &i.to_string()))
            .await
            .unwrap();
    }

    let page = find_books(&deps, &BookFilter::default(), PageRequest::new(1, 2))
        .await
        .unwrap();

    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.content[0].isbn, "2");
}
