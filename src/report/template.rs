//! Tera templates for charts and the HTML report

use rust_embed::Embed;
use tera::Tera;

use crate::core::error::Result;
use crate::report::chart::ChartLayout;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

pub const CHART_TEMPLATE: &str = "chart.svg.tera";
pub const REPORT_TEMPLATE: &str = "report.html.tera";

/// Renders the embedded templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a renderer with every embedded template registered
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html.tera", ".svg.tera"]);

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                let template_str = std::str::from_utf8(&content.data)
                    .map_err(|e| tera::Error::msg(format!("{}: {}", filename, e)))?;
                tera.add_raw_template(filename, template_str)?;
            }
        }

        Ok(Self { tera })
    }

    pub fn render_chart(&self, chart: &ChartLayout) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("chart", chart);
        Ok(self.tera.render(CHART_TEMPLATE, &context)?)
    }

    pub fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        Ok(self.tera.render(template, context)?)
    }
}
