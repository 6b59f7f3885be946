use super::*;
use crate::error::WriterError;
use crate::frontmatter::FixedChooser;
use crate::ledger::InMemoryLedger;
use crate::prompt::fallback_template;
use crate::quality::REQUIRED_SECTIONS;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use revpost_core::{SearchHit, SearchKind};
use revpost_search::SearchError;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Returns two hits of the requested kind for every query.
#[derive(Default)]
struct StaticSearch {
    calls: AtomicU32,
}

impl SearchProvider for StaticSearch {
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        _max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hits = (1..=2)
            .map(|i| match kind {
                SearchKind::Images => SearchHit {
                    title: format!("사진 {i}"),
                    url: format!("https://blog.example.com/{i}"),
                    image_url: Some(format!("https://img.example.com/{i}.jpg")),
                    width: Some(1200),
                    height: Some(800),
                    ..SearchHit::default()
                },
                SearchKind::Text | SearchKind::News => SearchHit {
                    title: format!("{query} 결과 {i}"),
                    body: "배터리 5000mAh, 무게 232g".to_string(),
                    url: format!("https://news.example.com/{i}"),
                    ..SearchHit::default()
                },
            })
            .collect();
        Ok(hits)
    }
}

/// Returns the same text for every call and records the user prompts.
struct FixedGenerator {
    text: String,
    prompts: Mutex<Vec<String>>,
}

impl FixedGenerator {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ContentGenerator for FixedGenerator {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, WriterError> {
        self.prompts.lock().unwrap().push(user.to_string());
        Ok(self.text.clone())
    }
}

struct PngFetcher {
    calls: AtomicU32,
}

impl PngFetcher {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }
}

impl ImageFetcher for PngFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, WriterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let img = ImageBuffer::from_pixel(1600, 800, Rgba([10u8, 120, 200, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img).write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

type TestPipeline = ReviewPipeline<StaticSearch, FixedGenerator, PngFetcher, InMemoryLedger>;

fn passing_review() -> String {
    let filler = "배터리 5000mAh, 무게 232g, 화면 6.8인치, 120Hz, 가격 169만원. ".repeat(6);
    REQUIRED_SECTIONS
        .iter()
        .map(|h| format!("### {h}\n{filler}\n"))
        .collect()
}

fn options(root: &Path) -> PipelineOptions {
    PipelineOptions {
        force_regenerate: false,
        disable_web_search: true,
        disable_llm: true,
        max_revisions: 2,
        max_images: 3,
        author: "리뷰 활짝".to_string(),
        default_cover_image: "/images/default-cover.webp".to_string(),
        posts_dir: root.join("posts"),
        style_dir: root.join("style"),
    }
}

fn pipeline(root: &Path, options: PipelineOptions, generator: FixedGenerator) -> TestPipeline {
    ReviewPipeline::new(
        StaticSearch::default(),
        generator,
        PngFetcher::new(),
        InMemoryLedger::default(),
        ImageStore::new(root.join("images"), "/images"),
        options,
    )
    .with_policy(BackoffPolicy::immediate(1))
    .with_chooser(FixedChooser(0))
}

fn post_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn offline_run_saves_template_post_and_records_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), options(dir.path()), FixedGenerator::new("unused"));

    let state = pipeline.run("갤럭시 S24 울트라 리뷰 작성").await;

    assert!(state.completed);
    assert_eq!(state.current_post.status, PostStatus::Saved);
    assert_eq!(state.product_name, "갤럭시 S24 울트라");
    assert_eq!(state.product_slug, "갤럭시-s24-울트라");
    assert!(state.current_post.from_template);
    assert_eq!(state.current_post.content, fallback_template("갤럭시 S24 울트라"));
    assert_eq!(state.revision_count, 0);

    let filename = state.current_post.filename.clone().unwrap();
    let pattern = regex::Regex::new(r"^review-갤럭시-s24-울트라-[0-9a-f]{6}\.md$").unwrap();
    assert!(pattern.is_match(&filename), "unexpected filename {filename}");

    let entries = pipeline.ledger().entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].product_name, "갤럭시 S24 울트라");
    assert_eq!(entries[0].filename, filename);

    let written = std::fs::read_to_string(dir.path().join("posts").join(&filename)).unwrap();
    assert_eq!(written, state.current_post.markdown);
    assert!(written.starts_with("---\n"));
    assert!(written.contains("image: /images/default-cover.webp"));
    assert!(written.contains("### 총평 및 추천 대상"));
    assert!(!written.contains("## 참고 자료"));

    assert_eq!(pipeline.search.calls.load(Ordering::SeqCst), 0);
    assert!(pipeline.generator.prompts().is_empty());
}

#[tokio::test]
async fn second_run_for_same_product_is_a_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), options(dir.path()), FixedGenerator::new("unused"));

    pipeline.run("갤럭시 S24 울트라 리뷰 작성").await;
    let state = pipeline.run("갤럭시 S24 울트라 리뷰 작성").await;

    assert!(state.completed);
    assert_eq!(state.current_post.status, PostStatus::Duplicate);
    assert!(state.current_post.filename.is_none());
    assert!(state.current_post.content.is_empty());
    assert_eq!(pipeline.ledger().entries().unwrap().len(), 1);
    assert_eq!(post_files(&dir.path().join("posts")).len(), 1);
}

#[tokio::test]
async fn force_regenerate_bypasses_duplicate_check() {
    let dir = tempfile::tempdir().unwrap();
    let opts = PipelineOptions {
        force_regenerate: true,
        ..options(dir.path())
    };
    let pipeline = pipeline(dir.path(), opts, FixedGenerator::new("unused"));

    pipeline.run("갤럭시 S24 울트라 리뷰 작성").await;
    let state = pipeline.run("갤럭시 S24 울트라 리뷰 작성").await;

    assert_eq!(state.current_post.status, PostStatus::Saved);
    assert_eq!(pipeline.ledger().entries().unwrap().len(), 2);
    assert_eq!(post_files(&dir.path().join("posts")).len(), 2);
}

#[tokio::test]
async fn short_content_with_sources_routes_back_to_generate() {
    let dir = tempfile::tempdir().unwrap();
    let opts = PipelineOptions {
        disable_web_search: false,
        disable_llm: false,
        ..options(dir.path())
    };
    let pipeline = pipeline(dir.path(), opts, FixedGenerator::new("unused"));

    let mut state = PipelineState::new("갤럭시 S24 울트라 리뷰 작성");
    state.product_name = "갤럭시 S24 울트라".to_string();
    state.search_results.basic_info.push(SearchHit {
        title: "기사".to_string(),
        url: "https://news.example.com/1".to_string(),
        ..SearchHit::default()
    });
    state.current_post.content = "가".repeat(400);

    let next = pipeline.step(Stage::Review, &mut state).await;

    assert_eq!(next, Stage::Generate);
    assert!(state.current_post.needs_revision);
    assert_eq!(state.revision_count, 1);
    assert!(state.feedback.starts_with("개선 필요:"));
}

#[tokio::test]
async fn full_run_interleaves_stored_images_and_cites_sources() {
    let dir = tempfile::tempdir().unwrap();
    let opts = PipelineOptions {
        disable_web_search: false,
        disable_llm: false,
        ..options(dir.path())
    };
    let pipeline = pipeline(dir.path(), opts, FixedGenerator::new(passing_review()));

    let state = pipeline.run("갤럭시 S24 울트라 리뷰 작성").await;

    assert_eq!(state.current_post.status, PostStatus::Saved);
    assert_eq!(state.revision_count, 0);
    assert!(!state.current_post.from_template);
    assert_eq!(pipeline.generator.prompts().len(), 1);
    assert_eq!(pipeline.search.calls.load(Ordering::SeqCst), 6);
    assert_eq!(state.current_post.sources.len(), 2);

    assert_eq!(state.images.len(), 2);
    assert_eq!(state.local_images.len(), 2);
    assert_eq!(pipeline.fetcher.calls.load(Ordering::SeqCst), 2);
    assert_eq!((state.local_images[0].width, state.local_images[0].height), (1200, 600));
    assert_eq!(post_files(&dir.path().join("images")).len(), 2);

    let markdown = &state.current_post.markdown;
    let cover = &state.local_images[0].path;
    assert!(cover.starts_with("/images/갤럭시-s24-울트라-1-"));
    assert!(markdown.starts_with("---\n"));
    assert!(markdown.contains(&format!("![갤럭시 S24 울트라 이미지 1]({cover})")));
    let intro = markdown.find("### 제품 소개").unwrap();
    let first_image = markdown.find("![갤럭시 S24 울트라 이미지 1]").unwrap();
    let features = markdown.find("### 주요 특징").unwrap();
    assert!(intro < first_image && first_image < features);
    assert!(markdown.contains("## 참고 자료"));
    assert!(markdown.contains("(https://news.example.com/1)"));
}

#[tokio::test]
async fn revise_loop_stops_at_the_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let opts = PipelineOptions {
        disable_web_search: false,
        disable_llm: false,
        ..options(dir.path())
    };
    let pipeline = pipeline(dir.path(), opts, FixedGenerator::new("너무 짧은 원고"));

    let state = pipeline.run("갤럭시 S24 울트라 리뷰 작성").await;

    assert_eq!(state.revision_count, 2);
    assert_eq!(state.current_post.status, PostStatus::Saved);
    assert_eq!(state.current_post.content, "너무 짧은 원고");
    assert_eq!(state.feedback, "최대 재시도 횟수(2) 도달 - 현재 상태로 진행");

    let prompts = pipeline.generator.prompts();
    assert_eq!(prompts.len(), 9);
    assert!(!prompts[0].contains("검토 의견"));
    assert!(prompts[3].contains("개선 필요:"));
}

#[tokio::test]
async fn style_excerpt_reaches_the_prompt_without_the_token() {
    let dir = tempfile::tempdir().unwrap();
    let style_dir = dir.path().join("style");
    std::fs::create_dir_all(&style_dir).unwrap();
    std::fs::write(style_dir.join("sample.md"), "첫째 줄 문체\n둘째 줄 문체\n셋째 줄\n").unwrap();

    let opts = PipelineOptions {
        disable_llm: false,
        ..options(dir.path())
    };
    let pipeline = pipeline(dir.path(), opts, FixedGenerator::new(passing_review()));

    let state = pipeline.run("에어팟 프로 2 리뷰 작성 @sample (1-2)").await;

    assert_eq!(state.product_name, "에어팟 프로 2");
    assert_eq!(state.clean_task, "에어팟 프로 2 리뷰 작성");
    let prompt = &pipeline.generator.prompts()[0];
    assert!(prompt.contains("첫째 줄 문체\n둘째 줄 문체"));
    assert!(!prompt.contains("셋째 줄"));
    assert!(prompt.ends_with("요청: 에어팟 프로 2 리뷰 작성"));
}

#[tokio::test]
async fn unwritable_posts_dir_still_completes_without_ledger_entry() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let opts = PipelineOptions {
        posts_dir: blocker.join("posts"),
        ..options(dir.path())
    };
    let pipeline = pipeline(dir.path(), opts, FixedGenerator::new("unused"));

    let state = pipeline.run("갤럭시 S24 울트라 리뷰 작성").await;

    assert!(state.completed);
    assert_eq!(state.current_post.status, PostStatus::Saved);
    assert!(pipeline.ledger().entries().unwrap().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn save_stage_creates_posts_dir_and_records_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let opts = PipelineOptions {
        posts_dir: dir.path().join("nested").join("posts"),
        ..options(dir.path())
    };
    let pipeline = pipeline(dir.path(), opts, FixedGenerator::new("unused"));

    let mut state = PipelineState::new("다이슨 V15 리뷰 작성");
    state.product_name = "다이슨 V15".to_string();
    state.product_slug = "다이슨-v15".to_string();
    state.current_post.markdown = "---\ntitle: t\n---\n\n### 제품 소개\n".to_string();

    let next = pipeline.step(Stage::Save, &mut state).await;

    assert_eq!(next, Stage::Done);
    assert!(state.completed);
    let filename = state.current_post.filename.clone().unwrap();
    let written =
        std::fs::read_to_string(dir.path().join("nested").join("posts").join(&filename)).unwrap();
    assert_eq!(written, state.current_post.markdown);
    let entries = pipeline.ledger().entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].filename, filename);
}
