use super::*;
use chrono::TimeZone;

const LIST_HEADER: &str = "Position,Const,Created,Modified,Description,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";
const RATINGS_HEADER: &str = "Const,Your Rating,Date Rated,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";

fn list_csv() -> String {
    [
        LIST_HEADER,
        "1,tt0111161,2020-01-01,2020-01-01,,The Shawshank Redemption,https://www.imdb.com/title/tt0111161/,Movie,9.3,142,1994,Drama,2500000,1994-09-23,Frank Darabont",
        "2,tt0944947,2020-01-02,2020-01-02,,Game of Thrones,https://www.imdb.com/title/tt0944947/,TV Series,9.2,57,2011,Action Drama Fantasy,2000000,2011-04-17,",
        "3,tt1480055,2020-01-03,2020-01-03,,Winter Is Coming,https://www.imdb.com/title/tt1480055/,TV Episode,8.9,62,2011,Drama,50000,2011-04-17,",
        "4,tt2103188,2020-01-04,2020-01-04,,Some Game,https://www.imdb.com/title/tt2103188/,Video Game,7.0,,2012,Action,1000,2012-01-01,",
    ]
    .join("\n")
}

#[test]
fn test_parse_list_csv() {
    let items = parse_list_csv(list_csv().as_bytes()).unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].key().unwrap(), "tt0111161");
    assert_eq!(items[0].title.as_deref(), Some("The Shawshank Redemption"));
    assert_eq!(items[0].year, Some(1994));
    assert_eq!(items[0].media_type, MediaType::Movie);
    assert_eq!(
        items[0].listed_at,
        Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(items[1].media_type, MediaType::Show);
    assert_eq!(items[2].media_type, MediaType::Episode);
    assert!(items.iter().all(|item| item.rating.is_none()));
}

#[test]
fn test_parse_list_csv_missing_column() {
    let result = parse_list_csv("Title,Year\nTest,2020".as_bytes());
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Missing required column"));
}

#[test]
fn test_parse_list_csv_empty_imdb_id() {
    let csv = format!(
        "{}\n1,,2020-01-01,2020-01-01,,Test Movie,https://www.imdb.com/title/tt1234567/,Movie,9.3,142,1994,Drama,2500000,1994-09-23,",
        LIST_HEADER
    );
    let items = parse_list_csv(csv.as_bytes()).unwrap();
    assert_eq!(items.len(), 0);
}

#[test]
fn test_parse_list_csv_header_only() {
    let items = parse_list_csv(LIST_HEADER.as_bytes()).unwrap();
    assert!(items.is_empty());
}

#[test]
fn test_parse_ratings_csv() {
    let csv = [
        RATINGS_HEADER,
        "tt0111161,10,2020-01-01,The Shawshank Redemption,https://www.imdb.com/title/tt0111161/,Movie,9.3,142,1994,Drama,2500000,1994-09-23,Frank Darabont",
        "tt0944947,9,2020-01-02,Game of Thrones,https://www.imdb.com/title/tt0944947/,TV Series,9.2,57,2011,Action Drama Fantasy,2000000,2011-04-17,",
    ]
    .join("\n");

    let ratings = parse_ratings_csv(csv.as_bytes()).unwrap();

    assert_eq!(ratings.len(), 2);
    assert_eq!(ratings[0].key().unwrap(), "tt0111161");
    assert_eq!(ratings[0].rating, Some(10));
    assert_eq!(
        ratings[0].rated_at,
        Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(ratings[1].rating, Some(9));
    assert_eq!(ratings[1].media_type, MediaType::Show);
}

#[test]
fn test_parse_ratings_csv_rejects_bad_rating() {
    let csv = format!(
        "{}\ntt0111161,eleven,2020-01-01,The Shawshank Redemption,,Movie,9.3,142,1994,Drama,2500000,1994-09-23,",
        RATINGS_HEADER
    );
    assert!(parse_ratings_csv(csv.as_bytes()).is_err());
}

#[test]
fn test_parse_export_date_formats() {
    let expected = Utc.with_ymd_and_hms(2021, 6, 5, 0, 0, 0).unwrap();
    assert_eq!(parse_export_date("2021-06-05").unwrap(), expected);
    assert_eq!(
        parse_export_date("Sat, 05 Jun 2021 00:00:00 +0000").unwrap(),
        expected
    );
    assert!(parse_export_date("yesterday").is_err());
}
