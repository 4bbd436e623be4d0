//! Catalog fixtures for unit and integration tests.
//!
//! | id | title                           | year | public | author            | tags                   |
//! |----|---------------------------------|------|--------|-------------------|------------------------|
//! | 1  | Memórias Póstumas de Brás Cubas | 1881 | yes    | Machado de Assis  | romance brazil classic |
//! | 2  | Germinal                        | 1885 | yes    | Émile Zola        | romance french classic |
//! | 3  | Dom Casmurro                    | 1899 | yes    | Machado de Assis  | romance brazil         |
//! | 4  | Água Viva                       | 1973 | no     | Clarice Lispector | brazil                 |
//! | 5  | A Hora da Estrela               | 1977 | no     | Clarice Lispector | brazil                 |
//! | 6  | Um Sopro de Vida                | 1977 | no     | Clarice Lispector | brazil                 |
//! | 7  | Iracema                         | 1865 | yes    | José de Alencar   | brazil classic         |
//! | 8  | Cartas Inéditas                 | NULL | no     | Machado de Assis  |                        |
//!
//! Book 1 carries six links (one per kind, two `read_online`); book 2 none.

use shelf_db::{apply_migrations, Database};
use sqlx::sqlite::SqlitePool;

use super::{CATALOG_MIGRATION, MODULE_NAME};

const FIXTURES: &str = r#"
    INSERT INTO authors (id, name) VALUES
        (1, 'Machado de Assis'),
        (2, 'José de Alencar'),
        (3, 'Émile Zola'),
        (4, 'Clarice Lispector');

    INSERT INTO books (id, title, year, slug, cover_url, is_public_domain, author_id) VALUES
        (1, 'Memórias Póstumas de Brás Cubas', 1881, 'memorias-postumas', 'https://covers.example/1.jpg', 1, 1),
        (2, 'Germinal', 1885, 'germinal', NULL, 1, 3),
        (3, 'Dom Casmurro', 1899, 'dom-casmurro', 'https://covers.example/3.jpg', 1, 1),
        (4, 'Água Viva', 1973, 'agua-viva', NULL, 0, 4),
        (5, 'A Hora da Estrela', 1977, 'a-hora-da-estrela', NULL, 0, 4),
        (6, 'Um Sopro de Vida', 1977, 'um-sopro-de-vida', NULL, 0, 4),
        (7, 'Iracema', 1865, 'iracema', NULL, 1, 2),
        (8, 'Cartas Inéditas', NULL, 'cartas-ineditas', NULL, 0, 1);

    INSERT INTO tags (id, name, slug) VALUES
        (1, 'Romance', 'romance'),
        (2, 'Brasil', 'brazil'),
        (3, 'Clássico', 'classic'),
        (4, 'França', 'french');

    INSERT INTO books_tags (book_id, tag_id) VALUES
        (1, 1), (1, 2), (1, 3),
        (2, 1), (2, 4), (2, 3),
        (3, 1), (3, 2),
        (4, 2),
        (5, 2),
        (6, 2),
        (7, 2), (7, 3);

    INSERT INTO links (id, book_id, kind, label, url) VALUES
        (1, 1, 'buy', 'Bookshop', 'https://shop.example/brascubas'),
        (2, 1, 'other', 'Audiobook', 'https://audio.example/brascubas'),
        (3, 1, 'read_online', 'Wikisource', 'https://wikisource.example/brascubas'),
        (4, 1, 'library', 'Biblioteca Nacional', 'https://bn.example/brascubas'),
        (5, 1, 'read_online', 'Gutenberg', 'https://gutenberg.example/brascubas'),
        (6, 1, 'source', 'Domínio Público', 'https://dominiopublico.example/brascubas');
"#;

/// Create the catalog schema and load the fixture rows into `pool`.
pub async fn seed_catalog(pool: &SqlitePool) {
    apply_migrations(pool, &[(MODULE_NAME.to_string(), CATALOG_MIGRATION)])
        .await
        .unwrap();
    sqlx::raw_sql(FIXTURES).execute(pool).await.unwrap();
}

/// In-memory database with the schema and fixtures loaded.
pub async fn seeded_database() -> Database {
    let pool = shelf_db::testing::create_test_pool().await;
    seed_catalog(&pool).await;
    Database::from_pool(pool)
}
