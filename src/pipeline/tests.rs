use super::*;
use crate::document::DocumentKind;
use crate::options::DateRedaction;
use chrono::NaiveDate;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, HasZipMetadata, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
 <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
 <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

const MODEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02" xmlns:BambuStudio="http://schemas.bambulab.com/package/2021" xmlns:p="http://schemas.microsoft.com/3dmanufacturing/production/2015/06" requiredextensions="p">
 <metadata name="Application">BambuStudio-01.09.00.70</metadata>
 <metadata name="BambuStudio:3mfVersion">1</metadata>
 <metadata name="CreationDate">2024-01-05</metadata>
 <metadata name="Designer">alice</metadata>
 <metadata name="DesignerCover"></metadata>
 <metadata name="DesignerUserId">1234567</metadata>
 <metadata name="ModificationDate">2024-02-11</metadata>
 <resources>
  <object id="2" p:UUID="00000001-61cb-4c03-9d28-80fed5dfa1dc" type="model">
   <components>
    <component p:path="/3D/Objects/object_1.model" objectid="1"/>
   </components>
  </object>
 </resources>
 <build p:UUID="2c7c17d8-22b5-4d84-8835-1976022ea369">
  <item objectid="2" p:UUID="00000002-b1ec-4553-aec9-835e5b724bb4" printable="1"/>
 </build>
</model>"#;

const OBJECT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02"><resources><object id="1" type="model"><mesh><vertices><vertex x="0" y="0" z="0"/></vertices></mesh></object></resources></model>"#;

const MODEL_SETTINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<config>
  <object id="2">
    <metadata key="name" value="widget.stl"/>
    <part id="1" subtype="normal_part">
      <metadata key="name" value="widget.stl"/>
      <metadata key="source_file">/home/alice/projects/widget.3mf</metadata>
    </part>
  </object>
</config>"#;

const PROJECT_SETTINGS: &str = "{\n    \"version\": \"01.09.00.70\",\n    \"layer_height\": \"0.2\",\n    \"name\": \"part\"\n}";

const SLICE_INFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<config>
  <header>
    <header_item key="X-BBL-Client-Type" value="slicer"/>
    <header_item key="X-BBL-Client-Version" value="01.09.00.70"/>
  </header>
</config>"#;

const THUMBNAIL: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn sample_entries() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("3D/3dmodel.model", MODEL.as_bytes().to_vec()),
        ("3D/Objects/object_1.model", OBJECT.as_bytes().to_vec()),
        ("Metadata/", Vec::new()),
        ("Metadata/plate_1.png", THUMBNAIL.to_vec()),
        ("Metadata/model_settings.config", MODEL_SETTINGS.as_bytes().to_vec()),
        ("Metadata/project_settings.config", PROJECT_SETTINGS.as_bytes().to_vec()),
        ("Metadata/slice_info.config", SLICE_INFO.as_bytes().to_vec()),
    ]
}

fn create_archive(path: &Path, entries: &[(&str, Vec<u8>)]) -> TestResult {
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options)?;
        } else {
            writer.start_file(*name, options)?;
            writer.write_all(contents)?;
        }
    }
    writer.finish()?;
    Ok(())
}

fn create_sample_3mf(path: &Path) -> TestResult {
    create_archive(path, &sample_entries())
}

fn read_entries(path: &Path) -> Result<Vec<(String, Vec<u8>)>, Box<dyn std::error::Error>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        entries.push((file.name().to_string(), contents));
    }
    Ok(entries)
}

fn read_text(path: &Path, name: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut contents = String::new();
    archive.by_name(name)?.read_to_string(&mut contents)?;
    Ok(contents)
}

fn sorted_names(entries: &[(String, Vec<u8>)]) -> Vec<String> {
    let mut names: Vec<String> = entries.iter().map(|(name, _)| name.clone()).collect();
    names.sort();
    names
}

#[test]
fn output_keeps_the_same_entry_names() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    create_sample_3mf(&source)?;

    let report = scrub_archive(&source, &output, &ScrubOptions::default(), &RuleCatalog::default())?;

    let before = read_entries(&source)?;
    let after = read_entries(&output)?;
    assert_eq!(sorted_names(&before), sorted_names(&after));
    assert_eq!(after.len(), before.len());
    assert_eq!(
        report.replaced,
        vec!["Metadata/model_settings.config", "3D/3dmodel.model"]
    );
    assert_eq!(report.copied, before.len() - 2);

    Ok(())
}

#[test]
fn redacted_entries_come_first_then_source_order() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    create_sample_3mf(&source)?;

    scrub_archive(&source, &output, &ScrubOptions::default(), &RuleCatalog::default())?;

    let names: Vec<String> = read_entries(&output)?
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(
        names,
        vec![
            "Metadata/model_settings.config",
            "3D/3dmodel.model",
            "[Content_Types].xml",
            "3D/Objects/object_1.model",
            "Metadata/",
            "Metadata/plate_1.png",
            "Metadata/project_settings.config",
            "Metadata/slice_info.config",
        ]
    );

    Ok(())
}

#[test]
fn untouched_entries_are_copied_byte_for_byte() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    create_sample_3mf(&source)?;

    let options = ScrubOptions {
        normalize_archive: false,
        ..ScrubOptions::default()
    };
    let report = scrub_archive(&source, &output, &options, &RuleCatalog::default())?;

    let after = read_entries(&output)?;
    for (name, contents) in read_entries(&source)? {
        if report.replaced.contains(&name) {
            continue;
        }
        let copied = after
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, bytes)| bytes)
            .expect("la entrada copiada debería existir");
        assert_eq!(copied, &contents, "la entrada `{name}` cambió");
    }

    Ok(())
}

#[test]
fn second_run_is_byte_identical() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let first = dir.path().join("first.3mf");
    let second = dir.path().join("second.3mf");
    create_sample_3mf(&source)?;

    let options = ScrubOptions {
        keep_model_filename: true,
        strip_application_version: true,
        ..ScrubOptions::default()
    };
    scrub_archive(&source, &first, &options, &RuleCatalog::default())?;
    scrub_archive(&first, &second, &options, &RuleCatalog::default())?;

    assert_eq!(fs::read(&first)?, fs::read(&second)?);

    Ok(())
}

#[test]
fn keep_designer_only_blanks_dates() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    create_sample_3mf(&source)?;

    let options = ScrubOptions {
        strip_designer: false,
        ..ScrubOptions::default()
    };
    scrub_archive(&source, &output, &options, &RuleCatalog::default())?;

    let model = read_text(&output, "3D/3dmodel.model")?;
    assert!(model.contains("<metadata name=\"Designer\">alice</metadata>"));
    assert!(model.contains("<metadata name=\"DesignerUserId\">1234567</metadata>"));
    assert!(model.contains("<metadata name=\"DesignerCover\"/>"));
    assert!(model.contains("<metadata name=\"CreationDate\">\n</metadata>"));
    assert!(model.contains("<metadata name=\"ModificationDate\">\n</metadata>"));
    assert!(model.contains("<metadata name=\"Application\">BambuStudio-01.09.00.70</metadata>"));
    assert!(model.contains("p:path=\"/3D/Objects/object_1.model\""));

    Ok(())
}

#[test]
fn model_path_keeps_only_the_filename_on_request() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    create_sample_3mf(&source)?;

    let kept = dir.path().join("kept.3mf");
    let options = ScrubOptions {
        keep_model_filename: true,
        ..ScrubOptions::default()
    };
    scrub_archive(&source, &kept, &options, &RuleCatalog::default())?;
    let settings = read_text(&kept, "Metadata/model_settings.config")?;
    assert!(settings.contains("<metadata key=\"source_file\">widget.3mf</metadata>"));
    assert!(!settings.contains("/home/alice"));

    let cleared = dir.path().join("cleared.3mf");
    scrub_archive(&source, &cleared, &ScrubOptions::default(), &RuleCatalog::default())?;
    let settings = read_text(&cleared, "Metadata/model_settings.config")?;
    assert!(settings.contains("<metadata key=\"source_file\">\n</metadata>"));
    assert!(settings.contains("<metadata key=\"name\" value=\"widget.stl\"/>"));

    Ok(())
}

#[test]
fn explicit_creation_date_is_written() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    create_sample_3mf(&source)?;

    let date = NaiveDate::from_ymd_opt(2024, 3, 15).expect("fecha válida");
    let options = ScrubOptions {
        creation_date: DateRedaction::ClearToDate(date),
        ..ScrubOptions::default()
    };
    scrub_archive(&source, &output, &options, &RuleCatalog::default())?;

    let model = read_text(&output, "3D/3dmodel.model")?;
    assert!(model.contains("<metadata name=\"CreationDate\">2024-03-15</metadata>"));
    assert!(model.contains("<metadata name=\"ModificationDate\">\n</metadata>"));

    Ok(())
}

#[test]
fn application_version_is_removed_everywhere() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    create_sample_3mf(&source)?;

    let options = ScrubOptions {
        strip_application_version: true,
        ..ScrubOptions::default()
    };
    let report = scrub_archive(&source, &output, &options, &RuleCatalog::default())?;
    assert_eq!(report.replaced.len(), 4);

    let project = read_text(&output, "Metadata/project_settings.config")?;
    assert_eq!(
        project,
        "{\n    \"version\": \"\",\n    \"layer_height\": \"0.2\",\n    \"name\": \"part\"\n}"
    );

    let slice = read_text(&output, "Metadata/slice_info.config")?;
    assert!(slice.contains(
        "<header_item key=\"X-BBL-Client-Version\" value=\"\">\n</header_item>"
    ));
    assert!(slice.contains("<header_item key=\"X-BBL-Client-Type\" value=\"slicer\"/>"));

    let model = read_text(&output, "3D/3dmodel.model")?;
    assert!(model.contains("<metadata name=\"Application\">\n</metadata>"));

    Ok(())
}

#[test]
fn normalization_fixes_packing_metadata() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    create_sample_3mf(&source)?;

    scrub_archive(&source, &output, &ScrubOptions::default(), &RuleCatalog::default())?;

    let mut archive = ZipArchive::new(File::open(&output)?)?;
    for index in 0..archive.len() {
        let file = archive.by_index(index)?;
        assert_eq!(file.comment(), crate::archive::normalizer::ENTRY_COMMENT);
        assert_eq!(file.get_metadata().system, zip::System::Unix);
        let modified = file.last_modified().expect("la entrada debería tener fecha");
        assert_eq!(
            (modified.year(), modified.month(), modified.day(), modified.hour()),
            (1980, 1, 1, 0)
        );
        if !file.is_dir() {
            assert_eq!(file.compression(), CompressionMethod::Deflated);
        }
    }

    Ok(())
}

#[test]
fn missing_required_entry_aborts_without_output() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    let entries: Vec<_> = sample_entries()
        .into_iter()
        .filter(|(name, _)| *name != "Metadata/model_settings.config")
        .collect();
    create_archive(&source, &entries)?;

    match scrub_archive(&source, &output, &ScrubOptions::default(), &RuleCatalog::default()) {
        Err(ScrubError::MissingEntry { entry }) => {
            assert_eq!(entry, "Metadata/model_settings.config")
        }
        other => panic!("se esperaba MissingEntry: {other:?}"),
    }
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);

    Ok(())
}

#[test]
fn non_zip_input_aborts_without_output() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    fs::write(&source, b"esto no es un zip")?;

    match scrub_archive(&source, &output, &ScrubOptions::default(), &RuleCatalog::default()) {
        Err(ScrubError::Archive(_)) => {}
        other => panic!("se esperaba un error del contenedor ZIP: {other:?}"),
    }
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);

    Ok(())
}

#[test]
fn malformed_document_aborts() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    let entries: Vec<_> = sample_entries()
        .into_iter()
        .map(|(name, contents)| match name {
            "Metadata/model_settings.config" => (name, b"<config><part></config>".to_vec()),
            _ => (name, contents),
        })
        .collect();
    create_archive(&source, &entries)?;

    match scrub_archive(&source, &output, &ScrubOptions::default(), &RuleCatalog::default()) {
        Err(ScrubError::MalformedDocument { entry, kind, .. }) => {
            assert_eq!(entry, "Metadata/model_settings.config");
            assert_eq!(kind, DocumentKind::Xml);
        }
        other => panic!("se esperaba MalformedDocument: {other:?}"),
    }
    assert!(!output.exists());

    Ok(())
}

#[test]
fn absent_fields_are_tolerated() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    let bare_model = r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02"><resources/><build/></model>"#;
    let entries: Vec<_> = sample_entries()
        .into_iter()
        .map(|(name, contents)| match name {
            "3D/3dmodel.model" => (name, bare_model.as_bytes().to_vec()),
            "Metadata/project_settings.config" => (name, b"{\"name\": \"part\"}".to_vec()),
            _ => (name, contents),
        })
        .collect();
    create_archive(&source, &entries)?;

    let options = ScrubOptions {
        strip_application_version: true,
        ..ScrubOptions::default()
    };
    scrub_archive(&source, &output, &options, &RuleCatalog::default())?;

    let model = read_text(&output, "3D/3dmodel.model")?;
    assert!(model.contains("<resources/><build/>"));
    assert_eq!(
        read_text(&output, "Metadata/project_settings.config")?,
        "{\n    \"name\": \"part\"\n}"
    );

    Ok(())
}

#[test]
fn catalog_override_changes_the_target_field() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    create_sample_3mf(&source)?;

    let catalog_path = dir.path().join("catalog.json");
    fs::write(
        &catalog_path,
        r#"{"project_settings": {"version_key": "layer_height"}}"#,
    )?;
    let catalog = RuleCatalog::from_path(&catalog_path)?;

    let options = ScrubOptions {
        strip_application_version: true,
        ..ScrubOptions::default()
    };
    scrub_archive(&source, &output, &options, &catalog)?;

    let project = read_text(&output, "Metadata/project_settings.config")?;
    assert!(project.contains("\"version\": \"01.09.00.70\""));
    assert!(project.contains("\"layer_height\": \"\""));

    Ok(())
}

#[test]
fn rules_sharing_an_entry_accumulate() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    let output = dir.path().join("clean.3mf");
    create_sample_3mf(&source)?;

    let mut catalog = RuleCatalog::default();
    catalog.slice_info.entry = "Metadata/model_settings.config".to_string();
    catalog.slice_info.client_version = crate::locator::XmlPath::under("object", "metadata", "key", "name");

    let options = ScrubOptions {
        strip_application_version: true,
        ..ScrubOptions::default()
    };
    let report = scrub_archive(&source, &output, &options, &catalog)?;
    assert_eq!(
        report.replaced,
        vec![
            "Metadata/model_settings.config",
            "Metadata/project_settings.config",
            "3D/3dmodel.model",
        ]
    );

    let settings = read_text(&output, "Metadata/model_settings.config")?;
    assert!(settings.contains("<metadata key=\"source_file\">\n</metadata>"));
    assert!(settings.contains("<metadata key=\"name\" value=\"\">\n</metadata>"));
    assert_eq!(read_entries(&output)?.len(), sample_entries().len());

    Ok(())
}

#[test]
fn output_may_replace_the_input() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("project.3mf");
    create_sample_3mf(&source)?;

    scrub_archive(&source, &source, &ScrubOptions::default(), &RuleCatalog::default())?;

    let model = read_text(&source, "3D/3dmodel.model")?;
    assert!(model.contains("<metadata name=\"Designer\">\n</metadata>"));
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);

    Ok(())
}
