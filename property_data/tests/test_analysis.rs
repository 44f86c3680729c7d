use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use property_data::analysis::{
    area_average_prices, highest_value_area, inventory, london_stats, most_affordable_area,
    new_build_comparison, representative_city, tenure_comparison,
};
use property_data::filters::{filter_by_areas, filter_central_london, filter_london};
use property_data::generator::generate_synthetic;
use property_data::schema::{PropertyType, TableSchema, Tenure, Transaction, TransactionTable};
use property_data::DataError;
use rstest::{fixture, rstest};

fn sale(price: u64, postcode: &str, city: Option<&str>) -> Transaction {
    Transaction {
        price,
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        postcode: postcode.to_string(),
        postcode_area: property_data::postcode::postcode_area(postcode).unwrap(),
        property_type: PropertyType::Flat,
        new_build: false,
        tenure: Tenure::Leasehold,
        city: city.map(str::to_string),
    }
}

#[fixture]
fn table() -> TransactionTable {
    let mut rows = vec![
        sale(900_000, "SW1A 1AA", Some("LONDON")),
        sale(1_100_000, "SW3 4RY", Some("LONDON")),
        sale(300_000, "E1 6AN", Some("LONDON")),
        sale(200_000, "KT1 1AA", Some("KINGSTON UPON THAMES")),
        sale(150_000, "B15 2TT", Some("BIRMINGHAM")),
        sale(160_000, "B1 1AA", Some("SOLIHULL")),
    ];
    rows[2].new_build = true;
    rows[3].tenure = Tenure::Freehold;
    rows[3].property_type = PropertyType::Detached;
    TransactionTable::new(rows, TableSchema { has_city: true })
}

#[rstest]
fn test_area_extremes(table: TransactionTable) {
    let averages = area_average_prices(&table);
    assert_eq!(averages.get("SW").copied(), Some(1_000_000.0));
    assert_eq!(averages.get("B").copied(), Some(155_000.0));

    let cheapest = most_affordable_area(&table).unwrap();
    assert_eq!(cheapest.area, "B");
    assert_eq!(cheapest.city.as_deref(), Some("BIRMINGHAM"));
    assert_eq!(cheapest.to_string(), "BIRMINGHAM (B) £155,000");

    let priciest = highest_value_area(&table).unwrap();
    assert_eq!(priciest.area, "SW");
    assert_eq!(priciest.to_string(), "LONDON (SW) £1,000,000");
}

#[rstest]
fn test_representative_city_breaks_ties_alphabetically(table: TransactionTable) {
    assert_eq!(representative_city(&table, "B").as_deref(), Some("BIRMINGHAM"));
    assert_eq!(representative_city(&table, "ZZ"), None);

    let no_city = TransactionTable::new(table.rows().to_vec(), TableSchema { has_city: false });
    assert_eq!(representative_city(&no_city, "SW"), None);
}

#[rstest]
fn test_inventory_lists_ties(table: TransactionTable) {
    let inv = inventory(&table).unwrap();
    assert_eq!(inv.most.area, "B");
    assert_eq!(inv.most.count, 2);

    let least: Vec<&str> = inv.least.iter().map(|a| a.area.as_str()).collect();
    assert_eq!(least, vec!["E", "KT"]);
    assert!(inv
        .to_string()
        .contains("Areas with least choices: LONDON (E), KINGSTON UPON THAMES (KT) (1 properties each)"));

    assert!(inventory(&TransactionTable::default()).is_none());
}

#[rstest]
fn test_comparisons(table: TransactionTable) {
    let builds = new_build_comparison(&table);
    assert_eq!(builds.new_build, Some(300_000.0));
    assert_eq!(builds.existing, Some(502_000.0));

    let tenure = tenure_comparison(&table);
    assert_eq!(tenure.freehold, Some(200_000.0));
    assert_eq!(tenure.leasehold, Some(522_000.0));
}

#[rstest]
fn test_london_filters_and_stats(table: TransactionTable) {
    let london = filter_london(&table);
    assert_eq!(london.len(), 4);

    let central = filter_central_london(&table);
    assert_eq!(central.len(), 3);

    let picked = filter_by_areas(&table, &["kt", "b"]);
    assert_eq!(picked.len(), 3);

    let stats = london_stats(&london).unwrap();
    assert_eq!(stats.total_properties, 4);
    assert_eq!(stats.avg_price, 625_000.0);
    assert_eq!(stats.median_price, 600_000.0);
    assert_eq!(stats.min_price, 200_000);
    assert_eq!(stats.max_price, 1_100_000);
    assert_eq!(stats.postcode_areas, 3);
    assert_eq!(stats.property_type_counts.get(&PropertyType::Flat), Some(&3));
    assert_eq!(stats.avg_price_by_type.get(&PropertyType::Detached), Some(&200_000.0));
}

#[test]
fn test_london_stats_empty() {
    let result = london_stats(&TransactionTable::default());
    assert!(matches!(result, Err(DataError::EmptyInput(_))));
}

#[test]
fn test_synthetic_table_feeds_analysis() {
    let table = generate_synthetic(1_000, 3);
    assert!(most_affordable_area(&table).is_some());
    assert!(highest_value_area(&table).unwrap().city.is_none());
}
