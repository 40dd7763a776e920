use crate::domain::model::{BatchResult, CaseRecord, Movement};
use quick_xml::escape::escape;

const STYLE: &str = "body{font-family:Arial,sans-serif;margin:24px}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:6px;text-align:left;vertical-align:top}\
th{background:#f0f0f0}.error{color:#a00}";

fn page(title: &str, generated_at: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="es">
  <head>
    <meta charset="UTF-8" />
    <title>{title}</title>
    <style>{style}</style>
  </head>
  <body>
    <h1>{title}</h1>
    <p><small>Generated {generated_at}</small></p>
{body}
  </body>
</html>
"#,
        title = escape(title),
        style = STYLE,
        generated_at = escape(generated_at),
        body = body,
    )
}

pub fn render_case(record: &CaseRecord, generated_at: &str) -> String {
    let mut body = format!(
        r#"    <table>
      <tr><th>Expediente</th><td>{id}</td></tr>
      <tr><th>Origen</th><td>{origin}</td></tr>
      <tr><th>Carátula</th><td>{title}</td></tr>
      <tr><th>Primer movimiento</th><td>{first}</td></tr>
    </table>
"#,
        id = escape(record.identifier.as_str()),
        origin = escape(record.origin.as_str()),
        title = escape(record.title.as_str()),
        first = escape(record.first_movement.as_str()),
    );

    if !record.movements.is_empty() {
        body.push_str("    <h2>Movimientos</h2>\n    <table>\n");
        body.push_str(
            "      <tr><th>Fecha</th><th>Tipo</th><th>Decreto</th><th>Vencimiento</th>\
             <th>Sede</th><th>Enlaces</th></tr>\n",
        );
        for mov in &record.movements {
            body.push_str(&movement_row(mov));
        }
        body.push_str("    </table>\n");
    }

    if !record.movement_urls.is_empty() {
        body.push_str("    <h2>Enlaces</h2>\n    <ul>\n");
        for url in &record.movement_urls {
            body.push_str(&format!("      <li>{}</li>\n", escape(url.as_str())));
        }
        body.push_str("    </ul>\n");
    }

    page(
        &format!("Expediente {}", record.identifier),
        generated_at,
        &body,
    )
}

fn movement_row(mov: &Movement) -> String {
    let mut links = String::new();
    if let Some(decree) = &mov.decree_link {
        links.push_str(&format!(
            r#"<a href="{url}"><strong>Decreto</strong></a> "#,
            url = escape(decree.as_str())
        ));
    }
    for link in mov.links.iter().filter(|l| Some(&l.url) != mov.decree_link.as_ref()) {
        links.push_str(&format!(
            r#"<a href="{url}">{kind}</a> "#,
            url = escape(link.url.as_str()),
            kind = escape(link.kind.as_str())
        ));
    }

    format!(
        "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        escape(mov.date.as_str()),
        escape(mov.kind.as_str()),
        escape(mov.decree.as_str()),
        escape(mov.expiry.as_str()),
        escape(mov.venue.as_str()),
        links.trim_end()
    )
}

pub fn render_batch(batch: &BatchResult, generated_at: &str) -> String {
    let mut body = String::from(
        "    <table>\n      <tr><th>Expediente</th><th>Origen</th><th>Carátula</th>\
         <th>Primer movimiento</th></tr>\n",
    );
    for entry in &batch.entries {
        let class = if entry.is_failed() { r#" class="error""# } else { "" };
        body.push_str(&format!(
            "      <tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            escape(entry.identifier()),
            escape(entry.origin()),
            escape(entry.title()),
            escape(entry.first_movement()),
        ));
    }
    body.push_str("    </table>\n");

    page(
        &format!(
            "Expedientes {}-{} a {}/{}",
            batch.venue, batch.start, batch.end, batch.year
        ),
        generated_at,
        &body,
    )
}
