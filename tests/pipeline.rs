use hotels_scraper::companies::{load_companies, sanity_check};
use hotels_scraper::indicators::load_indicators;
use hotels_scraper::links::internal_links;
use hotels_scraper::models::{Flavor, IndicatorHit};
use hotels_scraper::output::ResultTable;
use hotels_scraper::parser::Parser;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

const NIF: &str = "B12345678";
const EMPTY_NIF: &str = "A87654321";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join(name)
}

/// Lays out a dump folder the way the downloader would have left it.
fn dump_folder() -> tempfile::TempDir {
    let dump = tempfile::tempdir().expect("temp dir");
    let company = dump.path().join(NIF);
    fs::create_dir(&company).unwrap();
    for (source, target) in [
        ("empresa.html", format!("{}_Empresa.html", NIF)),
        ("empresa_sostenibilidad.html", format!("{}_Empresa_sostenibilidad.html", NIF)),
        ("booking.html", format!("{}_Booking.html", NIF)),
        ("google.html", format!("{}_Google.html", NIF)),
    ] {
        fs::copy(fixture("htmls").join(source), company.join(target)).unwrap();
    }
    fs::create_dir(dump.path().join(EMPTY_NIF)).unwrap();
    dump
}

fn parse_all() -> (tempfile::TempDir, ResultTable) {
    let dump = dump_folder();
    let indicators = load_indicators(&fixture("fixtures/indicadores.csv"), None).unwrap();
    let table = Parser::new(dump.path(), indicators)
        .with_workers(2)
        .find_indicators_in_htmls()
        .unwrap();
    (dump, table)
}

fn context<'a>(table: &'a ResultTable, nif: &str, name: &str) -> Option<&'a str> {
    let row = table.rows.iter().find(|row| row.nif == nif)?;
    row.hits.get(name)?.context.as_deref()
}

#[test]
fn rows_are_sorted_and_empty_companies_kept() {
    let (_dump, table) = parse_all();
    let nifs: Vec<&str> = table.rows.iter().map(|row| row.nif.as_str()).collect();
    assert_eq!(nifs, vec![EMPTY_NIF, NIF]);
    assert!(table.rows[0].hits.values().all(|hit| *hit == IndicatorHit::default()));
}

#[test]
fn booking_indicators() {
    let (_dump, table) = parse_all();

    assert_eq!(context(&table, NIF, "Booking_Agua"), Some("Se pueden reutilizar las toallas; "));
    assert_eq!(
        context(&table, NIF, "Booking_Residuos"),
        Some("Hay papeleras de reciclaje a disposición de los clientes y la basura se recicla; ")
    );
    assert_eq!(context(&table, NIF, "Booking_Energía"), Some("Hay parking de bicicletas; "));
    assert_eq!(context(&table, NIF, "Booking_Naturaleza"), None);
    assert_eq!(context(&table, NIF, "Booking_Puntuación"), Some("8,6"));
    assert_eq!(context(&table, NIF, "Booking_Comentarios"), Some("3.412"));
    assert_eq!(context(&table, NIF, "Booking_Estrellas"), Some("4"));
    assert_eq!(
        context(&table, NIF, "Booking_Certificados_Sostenibilidad"),
        Some("Mar Hotels_Planet Care")
    );
    assert_eq!(context(&table, NIF, "Booking_Nivel_Sostenibilidad"), Some("GOLD"));
}

#[test]
fn google_indicators() {
    let (_dump, table) = parse_all();

    assert_eq!(context(&table, NIF, "Google_Puntuación"), Some("4,4"));
    assert_eq!(context(&table, NIF, "Google_Reseñas"), Some("2.103"));
    assert_eq!(context(&table, NIF, "Google_Piscina"), Some("Piscina al aire libre"));
    assert_eq!(context(&table, NIF, "Google_Gimnasio"), None);
    assert_eq!(
        context(&table, NIF, "Google_Eficiencia_Energética"),
        Some("Eficiencia energética;Bombillas LED en la mayoría de las zonas;Paneles solares")
    );
}

#[test]
fn company_site_indicators_span_all_pages() {
    let (_dump, table) = parse_all();

    let biosphere = context(&table, NIF, "Empresa_Biosphere").unwrap();
    assert!(biosphere.contains("**certificación biosphere**"), "{}", biosphere);
    assert_eq!(
        context(&table, NIF, "Empresa_Energía"),
        Some("toda nuestra **energía renovable** procede de placas solares instaladas en la azotea.")
    );
    let residuos = context(&table, NIF, "Empresa_Residuos").unwrap();
    assert!(residuos.starts_with("90 | "), "{}", residuos);
    assert_eq!(context(&table, NIF, "Empresa_Spa"), None);
}

#[test]
fn saved_csv_has_flag_and_context_columns() {
    let (dump, table) = parse_all();
    let output = dump.path().join("resultados.csv");
    table.save(&output).unwrap();

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers[0], "NIF");
    let puntuacion = headers.iter().position(|h| h == "Booking_Puntuación").unwrap();
    assert_eq!(headers[puntuacion + 1], "Booking_Puntuación_Contexto");
    // No page mentions a spa, so there is no context column for it.
    let spa = headers.iter().position(|h| h == "Empresa_Spa").unwrap();
    assert!(!headers[spa + 1].starts_with("Empresa_Spa"));

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(&rows[1][0], NIF);
    assert_eq!(&rows[1][puntuacion], "True");
    assert_eq!(&rows[1][puntuacion + 1], "8,6");
    assert_eq!(&rows[0][puntuacion], "");

    assert!(dump.path().join("resultados.tsv").exists());
}

#[test]
fn listing_fixture_passes_sanity_check() {
    let companies = sanity_check(load_companies(&fixture("fixtures/empresas.csv")).unwrap()).unwrap();

    assert_eq!(companies[0].nif, EMPTY_NIF);
    assert_eq!(companies[0].url_for(Flavor::Booking), None);
    assert_eq!(companies[0].url_for(Flavor::Google), None);
    assert_eq!(companies[1].url_for(Flavor::Empresa), Some("https://www.hotelmarazul.es"));
}

#[test]
fn homepage_fixture_links() {
    let html = fs::read_to_string(fixture("htmls/empresa.html")).unwrap();
    let links = internal_links(&html, "https://www.hotelmarazul.es").unwrap();
    let pages: Vec<&str> = links.iter().map(|link| link.page_name.as_str()).collect();
    assert_eq!(pages, vec!["habitaciones", "sostenibilidad"]);
}
