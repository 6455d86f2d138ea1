use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde_json::json;

use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::db::{self, CatalogImageRecord, UploadedImageRecord, crud};

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}

impl SubCommandExtend for ShowCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let db = db::init_db(opts.database()).await?;
        let uploaded = crud::get_uploaded_images(&db).await?;
        let catalog = crud::get_catalog_images(&db).await?;
        let total = crud::count_catalog_images(&db).await?;

        match self.output_format {
            OutputFormat::Json => print_json(&uploaded, &catalog)?,
            OutputFormat::Table => print_table(&uploaded, &catalog, total),
        }
        Ok(())
    }
}

fn print_json(uploaded: &[UploadedImageRecord], catalog: &[CatalogImageRecord]) -> Result<()> {
    let value = json!({
        "uploaded": uploaded,
        "catalog": catalog,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_table(uploaded: &[UploadedImageRecord], catalog: &[CatalogImageRecord], total: i64) {
    match uploaded.first() {
        Some(image) => println!("uploaded\t{}", image.image_url),
        None => println!("uploaded\t-"),
    }
    println!("catalog\t{total}");
    for image in catalog {
        println!("{}\t{}\t{}\t{}", image.id, image.name, image.category, image.image_url);
    }
}
