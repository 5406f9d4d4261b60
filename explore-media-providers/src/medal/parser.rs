//! NexusPHP `medal.php` page parser
//!
//! Medal table columns, left to right: image, name with description,
//! sale window, validity, bonus rate, price, stock, buy button, gift button.
//! Some sites prepend an id column.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use explore_core::FetchError;

use super::Medal;

/// Cells in a row without the optional id column
const MIN_CELLS: usize = 9;

/// Text marking the column header row
const HEADER_IMAGE: &str = "图片";
const HEADER_DESCRIPTION: &str = "描述";
const NEXT_PAGE: &str = "下一页";

/// Medals on one page plus the page number the pager links to next
#[derive(Debug, Default)]
pub struct MedalPage {
    pub medals: Vec<Medal>,
    pub next_page: Option<u32>,
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Decode(format!("invalid selector '{css}': {e}")))
}

fn texts<'a>(element: &ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element.text().map(str::trim).filter(|t| !t.is_empty())
}

fn full_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse one medal page. A page without a medal table is a decode error.
pub fn parse_medal_page(html: &str, site_name: &str, site_url: &str) -> Result<MedalPage, FetchError> {
    let document = Html::parse_document(html);
    let table = find_medal_table(&document)?
        .ok_or_else(|| FetchError::Decode("medal table not found".to_string()))?;

    let row_selector = selector("tr")?;
    let header_selector = selector(r#"th, [class*="colhead"]"#)?;
    let cell_selector = selector("td")?;
    let img_selector = selector("img[src]")?;
    let input_selector = selector("input[value]")?;
    let base = site_base(site_url);

    let medals = table
        .select(&row_selector)
        .filter(|row| {
            row.select(&header_selector).next().is_none()
                && !row
                    .select(&cell_selector)
                    .any(|td| full_text(&td).contains(HEADER_IMAGE))
        })
        .filter_map(|row| {
            let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
            parse_row(&cells, &img_selector, &input_selector, base.as_ref(), site_name)
        })
        .collect();

    Ok(MedalPage {
        medals,
        next_page: next_page(&document)?,
    })
}

/// The classic layout nests the medal table inside `table.main`; other
/// themes are recognised by their header cells.
fn find_medal_table(document: &Html) -> Result<Option<ElementRef<'_>>, FetchError> {
    let nested = selector(r#"table.main table[border*="1"]"#)?;
    if let Some(table) = document.select(&nested).next() {
        return Ok(Some(table));
    }

    let cells = selector("td")?;
    let found = document
        .select(&cells)
        .filter(|td| full_text(td).contains(HEADER_IMAGE))
        .filter_map(|td| td.ancestors().filter_map(ElementRef::wrap).find(|e| e.value().name() == "table"))
        .find(|table| table.select(&cells).any(|td| full_text(&td).contains(HEADER_DESCRIPTION)));
    Ok(found)
}

fn parse_row(
    cells: &[ElementRef<'_>],
    img_selector: &Selector,
    input_selector: &Selector,
    base: Option<&Url>,
    site_name: &str,
) -> Option<Medal> {
    if cells.len() < MIN_CELLS {
        return None;
    }
    let first = full_text(&cells[0]);
    let offset = usize::from(!first.is_empty() && first.chars().all(|c| c.is_ascii_digit()));
    if cells.len() < MIN_CELLS + offset {
        return None;
    }
    let cell = |i: usize| &cells[i + offset];
    let first_text = |i: usize| texts(cell(i)).next().unwrap_or_default().to_string();
    let input_value = |i: usize| {
        cell(i)
            .select(input_selector)
            .next()
            .and_then(|input| input.value().attr("value"))
            .unwrap_or_default()
            .to_string()
    };

    let image_small = cell(0)
        .select(img_selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| absolute_url(base, src))
        .unwrap_or_default();
    let (name, description) = name_and_description(cell(1));
    let mut window = texts(cell(2));
    let (sale_begin_time, sale_end_time) = match (window.next(), window.next()) {
        (Some(begin), Some(end)) => (begin.to_string(), end.to_string()),
        _ => (String::new(), String::new()),
    };

    Some(Medal {
        name,
        description,
        image_small,
        sale_begin_time,
        sale_end_time,
        validity: first_text(3),
        bonus_rate: first_text(4),
        price: parse_price(&first_text(5)),
        stock: first_text(6),
        purchase_status: input_value(7),
        gift_status: input_value(8),
        site: site_name.to_string(),
        ..Medal::default()
    })
}

/// `<h1>` holds the name and the text right after it the description.
/// Without a heading the whole cell is the description.
fn name_and_description(cell: &ElementRef<'_>) -> (String, String) {
    let heading = cell
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "h1");
    match heading {
        Some(h1) => {
            let tail: String = h1
                .next_siblings()
                .map_while(|node| node.value().as_text().map(|t| String::from(&**t)))
                .collect();
            (full_text(&h1), tail.trim().to_string())
        }
        None => (String::new(), full_text(cell)),
    }
}

fn parse_price(text: &str) -> i64 {
    text.replace(',', "").trim().parse().unwrap_or(0)
}

fn site_base(site_url: &str) -> Option<Url> {
    Url::parse(&format!("{}/", site_url.trim_end_matches('/'))).ok()
}

fn absolute_url(base: Option<&Url>, src: &str) -> String {
    if src.starts_with("http") {
        return src.to_string();
    }
    base.and_then(|b| b.join(src.trim_start_matches('/')).ok())
        .map_or_else(|| src.to_string(), String::from)
}

/// Page number from the pager: the "下一页" link, or else the first link
/// after the highlighted current page
fn next_page(document: &Html) -> Result<Option<u32>, FetchError> {
    let pager = selector("p.nexus-pagination")?;
    let links = selector("a[href]")?;
    let Some(pager) = document.select(&pager).next() else {
        return Ok(None);
    };

    let href = pager
        .select(&links)
        .find(|a| full_text(a).contains(NEXT_PAGE))
        .or_else(|| {
            pager
                .children()
                .filter_map(ElementRef::wrap)
                .skip_while(|e| e.value().name() != "font")
                .find(|e| e.value().name() == "a")
        })
        .and_then(|a| a.value().attr("href"));

    Ok(href.and_then(page_param))
}

fn page_param(href: &str) -> Option<u32> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
}
