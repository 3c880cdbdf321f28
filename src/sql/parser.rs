//! SQL parser for CREATE TABLE statements.
//!
//! Best effort by contract: a statement, table element or reference that does
//! not fit the grammar below is dropped (and logged at debug level), never
//! reported as an error.
//!
//! ```text
//! script        := { create_table | other_statement }
//! create_table  := CREATE [TEMPORARY] TABLE [IF NOT EXISTS] name
//!                  '(' element {',' element} ')' [options] ';'
//! name          := ident {'.' ident}            -- schema prefixes are stripped
//! element       := [CONSTRAINT ident] (column | primary_key | unique | foreign_key)
//! column        := ident type ['(' size ')'] {column_option}
//! foreign_key   := FOREIGN KEY '(' ident ')' REFERENCES name '(' ident ')' {action}
//! ```
//!
//! Columns are collected first; table-level constraints are applied in a
//! second pass once every column of the table exists.

use super::lexer::{Lexer, Token};
use crate::schema::{Column, ForeignKeyRef, Position, Table, names_match};
use crate::types::ColumnType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("No valid tables found")]
    NoTables,
}

/// Parse every recognizable `CREATE TABLE` statement in `input`.
///
/// Tables get fresh ids and are laid out on a grid in statement order.
pub fn parse_sql(input: &str) -> Vec<Table> {
    let tokens = Lexer::new(input).tokenize();
    let mut tables = Parser::new(&tokens).parse();
    for (i, table) in tables.iter_mut().enumerate() {
        table.position = Position::grid(i);
    }
    tracing::debug!(tables = tables.len(), "parsed SQL script");
    tables
}

/// Like [`parse_sql`], but an input without a single usable table is an error.
pub fn import_sql(input: &str) -> Result<Vec<Table>, ImportError> {
    let tables = parse_sql(input);
    if tables.is_empty() {
        return Err(ImportError::NoTables);
    }
    Ok(tables)
}

static EOF: Token = Token::Eof;

/// One comma-separated entry of a table body.
#[derive(Debug, Clone, PartialEq)]
enum Element {
    Column(Column),
    Constraint(TableConstraint),
}

/// Table-level constraints that survive parsing. Multi-column keys do not.
#[derive(Debug, Clone, PartialEq)]
enum TableConstraint {
    PrimaryKey(String),
    Unique(String),
    ForeignKey {
        column: String,
        reference: ForeignKeyRef,
    },
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &'a Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn parse(&mut self) -> Vec<Table> {
        let mut tables: Vec<Table> = Vec::new();

        while self.current() != &Token::Eof {
            if self.current() != &Token::Create {
                self.advance();
                continue;
            }
            self.advance();

            while matches!(self.current(), Token::Ident(word) if is_table_modifier(word)) {
                self.advance();
            }
            if self.current() != &Token::Table {
                // CREATE INDEX, CREATE VIEW, ...
                self.skip_statement();
                continue;
            }
            self.advance();

            let Some(table) = self.parse_create_table() else {
                continue;
            };
            if tables.iter().any(|t| names_match(&t.name, &table.name)) {
                tracing::warn!(
                    table = %table.name,
                    "duplicate table name, keeping the first definition"
                );
                continue;
            }
            tables.push(table);
        }

        tables
    }

    fn parse_create_table(&mut self) -> Option<Table> {
        if self.current() == &Token::If {
            self.advance();
            if self.current() == &Token::Not {
                self.advance();
            }
            if self.current() == &Token::Exists {
                self.advance();
            }
        }

        let Some(name) = self.parse_qualified_name() else {
            tracing::debug!(token = ?self.current(), "dropping CREATE TABLE without a name");
            self.skip_statement();
            return None;
        };

        if self.current() != &Token::LParen {
            tracing::debug!(table = %name, "dropping CREATE TABLE without a column list");
            self.skip_statement();
            return None;
        }
        self.advance();

        let Some(fragments) = self.split_body() else {
            tracing::debug!(
                table = %name,
                "dropping CREATE TABLE with an unterminated column list"
            );
            return None;
        };

        // Table options (ENGINE=..., WITH (...)) up to the semicolon
        self.skip_statement();

        let elements: Vec<Element> = fragments
            .into_iter()
            .filter_map(|fragment| Parser::new(fragment).parse_element(&name))
            .collect();

        build_table(name, elements)
    }

    /// Split a table body on top-level commas, consuming the closing paren.
    /// `None` when the body is not closed before the statement ends.
    fn split_body(&mut self) -> Option<Vec<&'a [Token]>> {
        let mut fragments = Vec::new();
        let mut start = self.pos;
        let mut depth = 0usize;

        loop {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => {
                    fragments.push(&self.tokens[start..self.pos]);
                    self.advance();
                    return Some(fragments);
                }
                Token::RParen => depth -= 1,
                Token::Comma if depth == 0 => {
                    fragments.push(&self.tokens[start..self.pos]);
                    start = self.pos + 1;
                }
                Token::Create | Token::Semicolon | Token::Eof => return None,
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_element(&mut self, table: &str) -> Option<Element> {
        if self.current() == &Token::Constraint {
            self.advance();
            if let Token::Ident(_) = self.current() {
                self.advance();
            }
        }

        match self.current() {
            Token::Primary => self.parse_primary_key(table).map(Element::Constraint),
            Token::Unique => self.parse_unique(table).map(Element::Constraint),
            Token::Foreign => self.parse_foreign_key(table).map(Element::Constraint),
            Token::Ident(_) => self.parse_column(table).map(Element::Column),
            Token::Eof => None,
            other => {
                tracing::debug!(table, token = ?other, "dropping unsupported table element");
                None
            }
        }
    }

    fn parse_column(&mut self, table: &str) -> Option<Column> {
        let Token::Ident(name) = self.current() else {
            return None;
        };
        self.advance();

        let Token::Ident(type_name) = self.current() else {
            tracing::debug!(table, column = %name, "dropping column without a type");
            return None;
        };
        self.advance();

        let (typ, serial) = match ColumnType::from_serial(type_name) {
            Some(t) => (t, true),
            None => (self.parse_type_words(type_name), false),
        };

        let mut column = Column::new(name.clone(), typ);
        column.auto_increment = serial;
        if self.current() == &Token::LParen {
            column.size = self.parse_size();
        }
        self.parse_column_options(table, &mut column);

        Some(column)
    }

    /// Folds two-word spellings (`DOUBLE PRECISION`, `CHARACTER VARYING`).
    fn parse_type_words(&mut self, first: &str) -> ColumnType {
        if let Token::Ident(second) = self.current() {
            let folded = match (first.to_uppercase().as_str(), second.to_uppercase().as_str()) {
                ("DOUBLE", "PRECISION") => Some(ColumnType::Double),
                ("CHARACTER" | "CHAR", "VARYING") => Some(ColumnType::Varchar),
                _ => None,
            };
            if let Some(typ) = folded {
                self.advance();
                return typ;
            }
        }
        match first.to_uppercase().as_str() {
            "CHARACTER" => ColumnType::Char,
            _ => ColumnType::parse(first),
        }
    }

    /// Raw text between the parens after a type: `255`, `10,2`, `'a','b'`.
    fn parse_size(&mut self) -> Option<String> {
        self.advance(); // (
        let mut size = String::new();
        let mut depth = 0usize;

        loop {
            match self.current() {
                Token::RParen if depth == 0 => {
                    self.advance();
                    break;
                }
                Token::RParen => {
                    depth -= 1;
                    size.push(')');
                }
                Token::LParen => {
                    depth += 1;
                    size.push('(');
                }
                Token::Num(s) | Token::Ident(s) => size.push_str(s),
                Token::Str(s) => size.push_str(&quote_literal(s)),
                Token::Comma => size.push(','),
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }

        (!size.is_empty()).then_some(size)
    }

    fn parse_column_options(&mut self, table: &str, column: &mut Column) {
        let mut primary_key = false;

        loop {
            match self.current() {
                Token::Eof => break,
                Token::Primary => {
                    self.advance();
                    if self.current() == &Token::Key {
                        self.advance();
                    }
                    primary_key = true;
                }
                Token::Not => {
                    self.advance();
                    if self.current() == &Token::Null {
                        self.advance();
                        column.nullable = false;
                    }
                }
                Token::Unique => {
                    self.advance();
                    if self.current() == &Token::Key {
                        self.advance();
                    }
                    column.unique = true;
                }
                Token::Default => {
                    self.advance();
                    column.default_value = self.parse_default_value();
                }
                Token::AutoIncrement => {
                    self.advance();
                    column.auto_increment = true;
                }
                Token::Ident(word)
                    if word.eq_ignore_ascii_case("IDENTITY")
                        || word.eq_ignore_ascii_case("SERIAL") =>
                {
                    self.advance();
                    column.auto_increment = true;
                    if self.current() == &Token::LParen {
                        self.skip_parenthesized();
                    }
                }
                Token::References => {
                    self.advance();
                    match self.parse_reference() {
                        Some(reference) => column.foreign_key = Some(reference),
                        None => tracing::debug!(
                            table,
                            column = %column.name,
                            "dropping inline reference without a target column"
                        ),
                    }
                }
                Token::LParen => self.skip_parenthesized(),
                _ => self.advance(),
            }
        }

        if primary_key {
            column.mark_primary_key();
        }
    }

    /// Default as raw SQL text: quoted literals stay quoted, calls keep parens.
    fn parse_default_value(&mut self) -> Option<String> {
        let value = match self.current() {
            Token::Str(s) => quote_literal(s),
            Token::Prefixed(prefix, s) => format!("{}{}", prefix, quote_literal(s)),
            Token::Num(n) => n.clone(),
            Token::Null => "NULL".to_string(),
            Token::Ident(s) => {
                let mut value = s.clone();
                self.advance();
                if self.current() == &Token::LParen {
                    value.push_str(&self.collect_parenthesized());
                }
                return Some(value);
            }
            Token::LParen => return Some(self.collect_parenthesized()),
            _ => return None,
        };
        self.advance();
        Some(value)
    }

    fn parse_primary_key(&mut self, table: &str) -> Option<TableConstraint> {
        self.advance(); // PRIMARY
        if self.current() != &Token::Key {
            return None;
        }
        self.advance();

        match self.parse_column_list()?.as_slice() {
            [column] => Some(TableConstraint::PrimaryKey(column.clone())),
            columns => {
                tracing::debug!(table, ?columns, "dropping multi-column primary key");
                None
            }
        }
    }

    fn parse_unique(&mut self, table: &str) -> Option<TableConstraint> {
        self.advance(); // UNIQUE
        if matches!(self.current(), Token::Key | Token::Index) {
            self.advance();
        }
        // MySQL: UNIQUE KEY uk_name (col)
        if let Token::Ident(_) = self.current() {
            self.advance();
        }

        match self.parse_column_list()?.as_slice() {
            [column] => Some(TableConstraint::Unique(column.clone())),
            columns => {
                tracing::debug!(table, ?columns, "dropping multi-column unique constraint");
                None
            }
        }
    }

    fn parse_foreign_key(&mut self, table: &str) -> Option<TableConstraint> {
        self.advance(); // FOREIGN
        if self.current() != &Token::Key {
            return None;
        }
        self.advance();
        // MySQL: FOREIGN KEY fk_name (col)
        if let Token::Ident(_) = self.current() {
            self.advance();
        }

        let columns = self.parse_column_list()?;
        let [column] = columns.as_slice() else {
            tracing::debug!(table, ?columns, "dropping multi-column foreign key");
            return None;
        };

        if self.current() != &Token::References {
            tracing::debug!(table, column = %column, "dropping foreign key without REFERENCES");
            return None;
        }
        self.advance();

        let Some(reference) = self.parse_reference() else {
            tracing::debug!(
                table,
                column = %column,
                "dropping foreign key without a single target column"
            );
            return None;
        };

        // ON DELETE / ON UPDATE actions are not modelled
        Some(TableConstraint::ForeignKey {
            column: column.clone(),
            reference,
        })
    }

    /// `name '(' column ')'`, with the name's schema prefix stripped.
    fn parse_reference(&mut self) -> Option<ForeignKeyRef> {
        let table = self.parse_qualified_name()?;
        let columns = self.parse_column_list()?;
        match columns.as_slice() {
            [column] => Some(ForeignKeyRef::new(table, column.clone())),
            _ => None,
        }
    }

    /// `ident {'.' ident}`, keeping only the last part.
    fn parse_qualified_name(&mut self) -> Option<String> {
        let Token::Ident(first) = self.current() else {
            return None;
        };
        let mut name = first.clone();
        self.advance();

        while self.current() == &Token::Dot {
            self.advance();
            match self.current() {
                Token::Ident(part) => {
                    name = part.clone();
                    self.advance();
                }
                _ => return None,
            }
        }

        Some(name)
    }

    fn parse_column_list(&mut self) -> Option<Vec<String>> {
        if self.current() != &Token::LParen {
            return None;
        }
        self.advance();

        let mut columns = Vec::new();
        loop {
            match self.current() {
                Token::Ident(name) => {
                    columns.push(name.clone());
                    self.advance();
                }
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => return None,
                _ => self.advance(),
            }
        }

        Some(columns)
    }

    /// Text of a parenthesized expression, starting at `(`.
    fn collect_parenthesized(&mut self) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut after_word = false;

        loop {
            match self.current() {
                Token::Eof => break,
                Token::LParen => {
                    depth += 1;
                    text.push('(');
                    after_word = false;
                }
                Token::RParen => {
                    text.push(')');
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                    after_word = false;
                }
                Token::Comma => {
                    text.push(',');
                    after_word = false;
                }
                token => {
                    if let Some(word) = word_text(token) {
                        if after_word {
                            text.push(' ');
                        }
                        text.push_str(&word);
                        after_word = true;
                    }
                }
            }
            self.advance();
        }

        text
    }

    fn skip_parenthesized(&mut self) {
        if self.current() != &Token::LParen {
            self.advance();
            return;
        }
        self.advance();
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip to just past the next semicolon, stopping early at the next CREATE.
    fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Create | Token::Eof) {
            self.advance();
        }
        if self.current() == &Token::Semicolon {
            self.advance();
        }
    }
}

/// Pass 1 collects columns; pass 2 applies table-level constraints to them.
fn build_table(name: String, elements: Vec<Element>) -> Option<Table> {
    let mut table = Table::new(name);
    let mut constraints = Vec::new();

    for element in elements {
        match element {
            Element::Column(column) => {
                if table.column(&column.name).is_some() {
                    tracing::debug!(
                        table = %table.name,
                        column = %column.name,
                        "dropping duplicate column"
                    );
                    continue;
                }
                table.columns.push(column);
            }
            Element::Constraint(constraint) => constraints.push(constraint),
        }
    }

    // Only one inline PRIMARY KEY survives
    let mut seen_primary = false;
    for column in &mut table.columns {
        if column.primary_key {
            column.primary_key = !seen_primary;
            seen_primary = true;
        }
    }

    for constraint in constraints {
        match constraint {
            TableConstraint::PrimaryKey(column) => {
                if !table.set_primary_key(&column) {
                    tracing::debug!(
                        table = %table.name,
                        %column,
                        "dropping primary key on unknown column"
                    );
                }
            }
            TableConstraint::Unique(column) => match table.column_mut(&column) {
                Some(c) => c.unique = true,
                None => tracing::debug!(
                    table = %table.name,
                    %column,
                    "dropping unique constraint on unknown column"
                ),
            },
            TableConstraint::ForeignKey { column, reference } => match table.column_mut(&column) {
                Some(c) => c.foreign_key = Some(reference),
                None => tracing::debug!(
                    table = %table.name,
                    %column,
                    "dropping foreign key on unknown column"
                ),
            },
        }
    }

    if table.columns.is_empty() {
        tracing::debug!(table = %table.name, "dropping table without columns");
        return None;
    }

    Some(table)
}

fn is_table_modifier(word: &str) -> bool {
    ["TEMPORARY", "TEMP", "GLOBAL", "LOCAL", "UNLOGGED"]
        .iter()
        .any(|m| word.eq_ignore_ascii_case(m))
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn word_text(token: &Token) -> Option<String> {
    match token {
        Token::Ident(s) | Token::Num(s) => Some(s.clone()),
        Token::Str(s) => Some(quote_literal(s)),
        Token::Prefixed(prefix, s) => Some(format!("{}{}", prefix, quote_literal(s))),
        Token::Null => Some("NULL".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let sql = r#"
            CREATE TABLE users (
                id INT PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE
            );
        "#;

        let tables = parse_sql(sql);
        assert_eq!(tables.len(), 1);

        let users = &tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(users.columns.len(), 2);

        let id = &users.columns[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.typ, ColumnType::Int);
        assert!(id.primary_key);
        assert!(!id.nullable);
        assert!(id.unique);

        let email = &users.columns[1];
        assert_eq!(email.typ, ColumnType::Varchar);
        assert_eq!(email.size.as_deref(), Some("255"));
        assert!(!email.nullable);
        assert!(email.unique);
        assert!(!email.primary_key);
    }

    #[test]
    fn test_parse_table_level_foreign_key() {
        let sql = r#"
            CREATE TABLE users (id INT PRIMARY KEY);
            CREATE TABLE orders (
                id INT PRIMARY KEY,
                user_id INT,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
        "#;

        let tables = parse_sql(sql);
        assert_eq!(tables.len(), 2);
        let user_id = tables[1].column("user_id").unwrap();
        assert_eq!(user_id.foreign_key, Some(ForeignKeyRef::new("users", "id")));
    }

    #[test]
    fn test_foreign_key_declared_before_its_column() {
        let sql = "CREATE TABLE orders (FOREIGN KEY (user_id) REFERENCES users(id), user_id INT);";
        let tables = parse_sql(sql);
        assert!(tables[0].column("user_id").unwrap().foreign_key.is_some());
    }

    #[test]
    fn test_parse_inline_reference() {
        let sql =
            "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES public.users(id));";
        let tables = parse_sql(sql);
        let user_id = tables[0].column("user_id").unwrap();
        assert_eq!(user_id.foreign_key, Some(ForeignKeyRef::new("users", "id")));
    }

    #[test]
    fn test_foreign_key_on_unknown_column_is_dropped() {
        let sql = "CREATE TABLE orders (id INT, FOREIGN KEY (nope) REFERENCES users(id));";
        let tables = parse_sql(sql);
        assert_eq!(tables.len(), 1);
        assert!(tables[0].columns.iter().all(|c| c.foreign_key.is_none()));
    }

    #[test]
    fn test_parse_postgres_serial() {
        let sql = r#"
            CREATE TABLE "public"."users" (
                "id" SERIAL PRIMARY KEY,
                "name" TEXT
            );
        "#;

        let tables = parse_sql(sql);
        let users = &tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(users.columns[0].typ, ColumnType::Int);
        assert!(users.columns[0].auto_increment);
        assert!(users.columns[0].primary_key);
    }

    #[test]
    fn test_parse_mysql_auto_increment() {
        let sql = r#"
            CREATE TABLE IF NOT EXISTS `users` (
                `id` INT(11) NOT NULL AUTO_INCREMENT,
                `name` VARCHAR(255),
                PRIMARY KEY (`id`),
                UNIQUE KEY `uk_name` (`name`),
                KEY `idx_name` (`name`)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;
        "#;

        let tables = parse_sql(sql);
        let users = &tables[0];
        assert_eq!(users.columns.len(), 2);

        let id = &users.columns[0];
        assert_eq!(id.size.as_deref(), Some("11"));
        assert!(id.auto_increment);
        assert!(id.primary_key);
        assert!(users.columns[1].unique);
    }

    #[test]
    fn test_identity_and_autoincrement_spellings() {
        let sql = r#"
            CREATE TABLE [a] ([id] INT PRIMARY KEY IDENTITY(1,1));
            CREATE TABLE b (id INTEGER PRIMARY KEY AUTOINCREMENT);
        "#;
        let tables = parse_sql(sql);
        assert!(tables[0].columns[0].auto_increment);
        assert!(tables[1].columns[0].auto_increment);
        assert_eq!(tables[1].columns[0].typ, ColumnType::Int);
    }

    #[test]
    fn test_defaults_keep_raw_text() {
        let sql = r#"
            CREATE TABLE t (
                status VARCHAR(20) DEFAULT 'it''s',
                amount DECIMAL(10,2) DEFAULT 0.00,
                delta INT DEFAULT -1,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT now(),
                note TEXT DEFAULT NULL,
                flag BIT(1) DEFAULT b'1',
                label NVARCHAR(10) DEFAULT N'abc',
                bonus INT DEFAULT +1
            );
        "#;
        let t = &parse_sql(sql)[0];
        let default = |name: &str| t.column(name).unwrap().default_value.clone();

        assert_eq!(default("status").as_deref(), Some("'it''s'"));
        assert_eq!(default("amount").as_deref(), Some("0.00"));
        assert_eq!(t.column("amount").unwrap().size.as_deref(), Some("10,2"));
        assert_eq!(default("delta").as_deref(), Some("-1"));
        assert_eq!(default("created_at").as_deref(), Some("CURRENT_TIMESTAMP"));
        assert_eq!(default("updated_at").as_deref(), Some("now()"));
        assert_eq!(default("note").as_deref(), Some("NULL"));
        assert_eq!(default("flag").as_deref(), Some("b'1'"));
        assert_eq!(default("label").as_deref(), Some("N'abc'"));
        assert_eq!(default("bonus").as_deref(), Some("+1"));
    }

    #[test]
    fn test_mixed_script_keeps_recognizable_tables() {
        let sql = r#"
            SET NAMES utf8;
            CREATE TABLE a (id INT);
            INSERT INTO a VALUES (1);
            CREATE INDEX idx_a ON a(id);
            CREATE VIEW v AS SELECT * FROM a;
            CREATE TABLE b (id INT);
        "#;
        let names: Vec<String> = parse_sql(sql).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_unterminated_table_does_not_swallow_the_next() {
        let sql = "CREATE TABLE broken (id INT, CREATE TABLE ok (id INT);";
        let tables = parse_sql(sql);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "ok");
    }

    #[test]
    fn test_table_without_columns_is_dropped() {
        let sql = "CREATE TABLE empty (PRIMARY KEY (id)); CREATE TABLE nobody;";
        assert!(parse_sql(sql).is_empty());
    }

    #[test]
    fn test_composite_keys_are_dropped() {
        let sql = r#"
            CREATE TABLE link (
                a INT,
                b INT,
                PRIMARY KEY (a, b),
                FOREIGN KEY (a, b) REFERENCES other(x, y)
            );
        "#;
        let t = &parse_sql(sql)[0];
        assert!(t.columns.iter().all(|c| !c.primary_key && c.foreign_key.is_none()));
    }

    #[test]
    fn test_named_constraints() {
        let sql = r#"
            CREATE TABLE orders (
                id INT,
                user_id INT,
                CONSTRAINT pk_orders PRIMARY KEY (id),
                CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users (id),
                CONSTRAINT chk_id CHECK (id > 0)
            );
        "#;
        let t = &parse_sql(sql)[0];
        assert_eq!(t.primary_key().unwrap().name, "id");
        assert!(t.column("user_id").unwrap().foreign_key.is_some());
    }

    #[test]
    fn test_single_primary_key_survives() {
        let sql = "CREATE TABLE t (a INT PRIMARY KEY, b INT PRIMARY KEY);";
        let t = &parse_sql(sql)[0];
        assert_eq!(t.columns.iter().filter(|c| c.primary_key).count(), 1);
        assert!(t.columns[0].primary_key);
    }

    #[test]
    fn test_two_word_types_and_enum() {
        let sql = r#"
            CREATE TABLE t (
                name CHARACTER VARYING(100),
                ratio DOUBLE PRECISION,
                mood ENUM('happy','sad')
            );
        "#;
        let t = &parse_sql(sql)[0];
        assert_eq!(t.columns[0].typ, ColumnType::Varchar);
        assert_eq!(t.columns[0].size.as_deref(), Some("100"));
        assert_eq!(t.columns[1].typ, ColumnType::Double);
        assert_eq!(t.columns[2].typ, ColumnType::Other("ENUM".to_string()));
        assert_eq!(t.columns[2].size.as_deref(), Some("'happy','sad'"));
    }

    #[test]
    fn test_duplicate_table_keeps_first() {
        let sql = "CREATE TABLE t (a INT); CREATE TABLE T (b INT);";
        let tables = parse_sql(sql);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns[0].name, "a");
    }

    #[test]
    fn test_parsed_tables_get_fresh_ids() {
        let tables = parse_sql("CREATE TABLE a (id INT); CREATE TABLE b (id INT);");
        assert_ne!(tables[0].id, tables[1].id);
        assert_eq!(tables[1].position, Position::grid(1));
    }

    #[test]
    fn test_import_without_tables_is_an_error() {
        assert_eq!(import_sql("SELECT 1;"), Err(ImportError::NoTables));
        assert_eq!(import_sql("").unwrap_err().to_string(), "No valid tables found");
        assert_eq!(import_sql("CREATE TABLE a (id INT);").unwrap().len(), 1);
    }
}
