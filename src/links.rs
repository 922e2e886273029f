use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::{BTreeMap, BTreeSet};

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a[href]").unwrap();
}

const SKIPPED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "png", "mp4"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalLink {
    /// Last path segment, used to name the snapshot file.
    pub page_name: String,
    pub url: String,
}

/// `scheme://host` of a URL.
pub fn site_root(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("URL has no host: {}", url))?;
    Ok(format!("{}://{}", parsed.scheme(), host))
}

/// Same-site page links of a company homepage, one per page name, sorted by page name.
pub fn internal_links(html: &str, page_url: &str) -> Result<Vec<InternalLink>> {
    let root = site_root(page_url)?;
    let document = Html::parse_document(html);

    let hrefs: BTreeSet<&str> = document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| {
            href.starts_with(&root) || (href.starts_with('/') && !href.starts_with("//"))
        })
        .filter(|href| !SKIPPED_EXTENSIONS.iter().any(|ext| href.ends_with(ext)))
        .collect();

    let mut links = BTreeMap::new();
    for href in hrefs {
        let link = href.strip_suffix('/').unwrap_or(href);
        let link = link.split('?').next().unwrap_or(link).replace('\n', "");

        let raw_name = link.rsplit('/').next().unwrap_or_default();
        if raw_name.is_empty() || raw_name.starts_with(['?', '#', '@']) {
            continue;
        }
        let page_name = urlencoding::decode(raw_name)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw_name.to_string())
            .replace(['/', '\\'], "_");

        let url = if link.starts_with('/') {
            format!("{}{}", root, link)
        } else {
            link.clone()
        };
        links.entry(page_name).or_insert(url);
    }

    Ok(links
        .into_iter()
        .map(|(page_name, url)| InternalLink { page_name, url })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_drops_path_and_query() {
        assert_eq!(site_root("https://www.hotelmar.es/es/inicio?x=1").unwrap(), "https://www.hotelmar.es");
        assert!(site_root("not a url").is_err());
    }

    #[test]
    fn keeps_same_site_pages_only() {
        let html = r##"
            <a href="https://www.hotelmar.es/sostenibilidad/">Sostenibilidad</a>
            <a href="/habitaciones?lang=es">Habitaciones</a>
            <a href="/habitaciones">Habitaciones otra vez</a>
            <a href="/docs/memoria.pdf">Memoria</a>
            <a href="/img/fachada.jpg">Foto</a>
            <a href="https://www.booking.com/hotel/es/mar.html">Booking</a>
            <a href="//cdn.hotelmar.es/app.js">CDN</a>
            <a href="/">Inicio</a>
            <a href="/#reservar">Reservar</a>
            <a href="/nuestro%20equipo">Equipo</a>
            <a>Sin enlace</a>
        "##;
        let links = internal_links(html, "https://www.hotelmar.es/").unwrap();

        assert_eq!(
            links,
            vec![
                InternalLink {
                    page_name: "habitaciones".into(),
                    url: "https://www.hotelmar.es/habitaciones".into(),
                },
                InternalLink {
                    page_name: "nuestro equipo".into(),
                    url: "https://www.hotelmar.es/nuestro%20equipo".into(),
                },
                InternalLink {
                    page_name: "sostenibilidad".into(),
                    url: "https://www.hotelmar.es/sostenibilidad".into(),
                },
            ]
        );
    }
}
