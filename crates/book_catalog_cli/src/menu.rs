//! Interactive menu loop.
//!
//! # Responsibility
//! - Prompt for input, call the catalog store, and render results.
//!
//! # Invariants
//! - Prompt state lives in a `Session` value owned by `run`; nothing here is
//!   process-global.
//! - End of input behaves like choosing "Exit".

use book_catalog_core::{
    BookFields, BookRecord, CatalogBackend, CatalogError, CatalogStore, ConsistencyMode,
    RemoveKey, SearchField,
};
use std::io::{self, BufRead, Write};

/// Reader/writer pair for one interactive session.
struct Session<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Prints `label` and reads one line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, message: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", message.as_ref())
    }
}

/// Runs the menu until the user exits or input ends.
pub fn run<B, R, W>(store: &CatalogStore<B>, input: R, output: W) -> io::Result<()>
where
    B: CatalogBackend,
    R: BufRead,
    W: Write,
{
    let mut session = Session { input, output };

    loop {
        print_menu(&mut session)?;
        let Some(choice) = session.prompt("Enter your choice: ")? else {
            break;
        };
        let keep_going = match choice.trim() {
            "1" => add_book(store, &mut session)?,
            "2" => remove_book(store, &mut session)?,
            "3" => search_books(store, &mut session)?,
            "4" => display_all_books(store, &mut session)?,
            "5" => display_statistics(store, &mut session)?,
            "6" => false,
            _ => {
                session.say("Invalid choice. Please enter a number between 1 and 6.")?;
                true
            }
        };
        if !keep_going {
            break;
        }
    }

    session.say("Goodbye!")
}

fn print_menu<R: BufRead, W: Write>(session: &mut Session<R, W>) -> io::Result<()> {
    session.say("\nWelcome to your Personal Library Manager!")?;
    session.say("1. Add a book")?;
    session.say("2. Remove a book")?;
    session.say("3. Search for a book")?;
    session.say("4. Display all books")?;
    session.say("5. Display statistics")?;
    session.say("6. Exit")
}

/// Formats one list line, e.g. `1. Dune by Herbert (1965) - SF - Read`.
pub fn format_book(position: usize, book: &BookRecord) -> String {
    let year = book
        .publication_year
        .map_or_else(|| "n/a".to_string(), |year| year.to_string());
    let status = if book.is_read() { "Read" } else { "Unread" };
    let mut line = format!(
        "{position}. {} by {} ({year}) - {} - {status}",
        book.title, book.author, book.genre
    );
    if let Some(isbn) = book.isbn_key() {
        line.push_str(&format!(" - ISBN {isbn}"));
    }
    line
}

// Each handler returns `Ok(false)` when input ended mid-dialog.

fn add_book<B, R, W>(store: &CatalogStore<B>, session: &mut Session<R, W>) -> io::Result<bool>
where
    B: CatalogBackend,
    R: BufRead,
    W: Write,
{
    let Some(title) = session.prompt("Enter the book title: ")? else {
        return Ok(false);
    };
    let Some(author) = session.prompt("Enter the author: ")? else {
        return Ok(false);
    };
    let year = loop {
        let Some(raw) = session.prompt("Enter the publication year: ")? else {
            return Ok(false);
        };
        match raw.trim().parse::<i32>() {
            Ok(year) if year >= 0 => break year,
            _ => session.say("Please enter a valid year.")?,
        }
    };
    let Some(genre) = session.prompt("Enter the genre: ")? else {
        return Ok(false);
    };

    let mut fields = BookFields::new(title, author)
        .with_year(year)
        .with_genre(genre);

    match store.mode() {
        ConsistencyMode::UniqueIsbn => {
            let Some(isbn) = session.prompt("Enter the ISBN: ")? else {
                return Ok(false);
            };
            fields.isbn = Some(isbn);
        }
        ConsistencyMode::ReadStatus => {
            let read = loop {
                let Some(raw) = session.prompt("Have you read this book? (yes/no): ")? else {
                    return Ok(false);
                };
                match raw.trim().to_lowercase().as_str() {
                    "yes" => break true,
                    "no" => break false,
                    _ => session.say("Please enter 'yes' or 'no'.")?,
                }
            };
            fields.read = Some(read);
        }
    }

    match store.add(fields) {
        Ok(_) => session.say("Book added successfully!")?,
        Err(err) => report_error(session, &err)?,
    }
    Ok(true)
}

fn remove_book<B, R, W>(store: &CatalogStore<B>, session: &mut Session<R, W>) -> io::Result<bool>
where
    B: CatalogBackend,
    R: BufRead,
    W: Write,
{
    let Some(title) = session.prompt("Enter the title of the book to remove: ")? else {
        return Ok(false);
    };
    match store.remove(&RemoveKey::Title(title)) {
        Ok(true) => session.say("Book removed successfully!")?,
        Ok(false) => session.say("Book not found.")?,
        Err(err) => report_error(session, &err)?,
    }
    Ok(true)
}

fn search_books<B, R, W>(store: &CatalogStore<B>, session: &mut Session<R, W>) -> io::Result<bool>
where
    B: CatalogBackend,
    R: BufRead,
    W: Write,
{
    session.say("Search by:")?;
    session.say("1. Title")?;
    session.say("2. Author")?;
    session.say("3. ISBN")?;
    session.say("4. Any field")?;
    let Some(choice) = session.prompt("Enter your choice: ")? else {
        return Ok(false);
    };
    let field = match choice.trim() {
        "1" => SearchField::Title,
        "2" => SearchField::Author,
        "3" => SearchField::Isbn,
        "4" => SearchField::Any,
        _ => {
            session.say("Invalid choice.")?;
            return Ok(true);
        }
    };
    let Some(term) = session.prompt(&format!("Enter the {field}: "))? else {
        return Ok(false);
    };

    match store.search(&term, field) {
        Ok(matches) if matches.is_empty() => session.say("No matching books found.")?,
        Ok(matches) => {
            session.say("Matching Books:")?;
            for (index, book) in matches.iter().enumerate() {
                session.say(format_book(index + 1, book))?;
            }
        }
        Err(err) => report_error(session, &err)?,
    }
    Ok(true)
}

fn display_all_books<B, R, W>(
    store: &CatalogStore<B>,
    session: &mut Session<R, W>,
) -> io::Result<bool>
where
    B: CatalogBackend,
    R: BufRead,
    W: Write,
{
    match store.list() {
        Ok(books) if books.is_empty() => session.say("Your library is empty.")?,
        Ok(books) => {
            session.say("Your Library:")?;
            for (index, book) in books.iter().enumerate() {
                session.say(format_book(index + 1, book))?;
            }
        }
        Err(err) => report_error(session, &err)?,
    }
    Ok(true)
}

fn display_statistics<B, R, W>(
    store: &CatalogStore<B>,
    session: &mut Session<R, W>,
) -> io::Result<bool>
where
    B: CatalogBackend,
    R: BufRead,
    W: Write,
{
    match store.statistics() {
        Ok(stats) => session.say(stats.to_string())?,
        Err(err) => report_error(session, &err)?,
    }
    Ok(true)
}

fn report_error<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    err: &CatalogError,
) -> io::Result<()> {
    match err {
        CatalogError::Validation(reason) => {
            session.say(format!("Please fix the book details: {reason}."))
        }
        CatalogError::Conflict { isbn } => {
            session.say(format!("A book with ISBN {isbn} is already in your library."))
        }
        CatalogError::NotFound(_) => session.say("Book not found."),
        other => session.say(format!("Error saving library: {other}")),
    }
}
