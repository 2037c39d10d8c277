//! Query builders and data assembly for the population charts

use duckpond_engine::convert::cell_to_number;
use duckpond_engine::{sql, Connection, EngineError};

pub const FIRST_YEAR: u32 = 1960;
pub const LAST_YEAR: u32 = 2023;

/// The static year dimension, "1960".."2023"
pub fn build_year_list() -> Vec<String> {
    (FIRST_YEAR..=LAST_YEAR).map(|year| year.to_string()).collect()
}

/// Case-insensitive in-memory prefix filter for the year list
pub fn filter_years(years: &[String], prefix: &str) -> Vec<String> {
    if prefix.is_empty() {
        return years.to_vec();
    }
    let prefix = prefix.to_uppercase();
    years
        .iter()
        .filter(|year| year.starts_with(&prefix))
        .cloned()
        .collect()
}

fn quote_literal(text: &str) -> String {
    text.replace('\'', "''")
}

/// Countries whose upper-cased name starts with the search word
pub fn countries_sql(table: &str, search_word: &str) -> String {
    format!(
        "SELECT \"Country Name\" FROM {table} WHERE upper(\"Country Name\") LIKE '{}%';",
        quote_literal(&search_word.to_uppercase())
    )
}

/// One wide row: every year column cast to BIGINT, for one country
pub fn population_by_country_sql(table: &str, years: &[String], country: &str) -> String {
    let columns: Vec<String> = years
        .iter()
        .map(|year| format!("\"{year}\"::BIGINT AS \"{year}\""))
        .collect();
    format!(
        "SELECT {} FROM {table} WHERE \"Country Name\" = '{}';",
        columns.join(","),
        quote_literal(country)
    )
}

/// Top 30 countries by population for one year, descending
pub fn population_by_year_sql(table: &str, year: &str) -> String {
    format!(
        "SELECT \"Country Name\",\"{year}\"::BIGINT FROM {table} ORDER BY \"{year}\"::BIGINT DESC LIMIT 30;"
    )
}

pub async fn countries(
    conn: &Connection,
    table: &str,
    search_word: &str,
) -> Result<Vec<String>, EngineError> {
    let result = sql::query_rows(conn, &countries_sql(table, search_word)).await?;
    Ok(result.into_first_column())
}

/// Population per year for one country, in year-list order
pub async fn population_by_country(
    conn: &Connection,
    table: &str,
    years: &[String],
    country: &str,
) -> Result<Vec<f64>, EngineError> {
    let result = sql::query_rows(conn, &population_by_country_sql(table, years, country)).await?;
    let Some(row) = result.rows.first() else {
        return Ok(Vec::new());
    };
    Ok(row.iter().map(|cell| cell_to_number(cell)).collect())
}

/// (country, population) pairs for one year; the leading world aggregate
/// row is dropped
pub async fn population_by_year(
    conn: &Connection,
    table: &str,
    year: &str,
) -> Result<Vec<(String, f64)>, EngineError> {
    let mut result = sql::query_rows(conn, &population_by_year_sql(table, year)).await?;
    if !result.rows.is_empty() {
        result.rows.remove(0);
    }
    Ok(result
        .rows
        .into_iter()
        .filter_map(|row| {
            let mut cells = row.into_iter();
            let country = cells.next()?;
            let population = cell_to_number(&cells.next()?);
            Some((country, population))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_list_spans_the_full_range() {
        let years = build_year_list();
        assert_eq!(years.len(), 64);
        assert_eq!(years.first().map(String::as_str), Some("1960"));
        assert_eq!(years.last().map(String::as_str), Some("2023"));
    }

    #[test]
    fn year_filter_is_prefix_based() {
        let years = build_year_list();
        let sixties = filter_years(&years, "196");
        assert_eq!(sixties.len(), 10);
        assert!(sixties.iter().all(|year| year.starts_with("196")));
        assert_eq!(filter_years(&years, ""), years);
        assert!(filter_years(&years, "3000").is_empty());
    }

    #[test]
    fn country_search_upper_cases_the_prefix() {
        let query = countries_sql("world_populations", "jap");
        assert!(query.contains("LIKE 'JAP%'"));
        assert!(query.contains("upper(\"Country Name\")"));
    }

    #[test]
    fn country_pivot_casts_every_year_column() {
        let years = build_year_list();
        let query = population_by_country_sql("world_populations", &years, "Japan");
        assert!(query.contains("\"1960\"::BIGINT AS \"1960\""));
        assert!(query.contains("\"2023\"::BIGINT AS \"2023\""));
        assert!(query.ends_with("WHERE \"Country Name\" = 'Japan';"));
    }

    #[test]
    fn year_ranking_orders_descending_with_limit() {
        let query = population_by_year_sql("world_populations", "2000");
        assert!(query.contains("ORDER BY \"2000\"::BIGINT DESC LIMIT 30"));
    }

    #[test]
    fn search_words_cannot_break_out_of_the_literal() {
        let query = countries_sql("world_populations", "o'brien");
        assert!(query.contains("'O''BRIEN%'"));
    }
}
