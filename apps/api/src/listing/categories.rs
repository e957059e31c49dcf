use serde::Serialize;

use crate::listing::filters::{compile, FilterState};
use crate::models::Job;

/// A portal category. `value` is what jobs store in their `category` field;
/// `name` is the short label the home page links with, `slug` the URL form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub slug: &'static str,
    pub value: &'static str,
}

pub const CATEGORIES: [Category; 8] = [
    Category {
        name: "IT - Phần mềm",
        slug: "cong-nghe-thong-tin",
        value: "Công nghệ thông tin",
    },
    Category {
        name: "Marketing",
        slug: "marketing-truyen-thong",
        value: "Marketing - Truyền thông",
    },
    Category {
        name: "Kinh doanh",
        slug: "kinh-doanh-ban-hang",
        value: "Kinh doanh - Bán hàng",
    },
    Category {
        name: "Thiết kế",
        slug: "thiet-ke-do-hoa",
        value: "Thiết kế - Đồ hoạ",
    },
    Category {
        name: "Tài chính",
        slug: "ke-toan-tai-chinh",
        value: "Kế toán - Tài chính - Ngân hàng",
    },
    Category {
        name: "Nhân sự",
        slug: "nhan-su-hanh-chinh",
        value: "Nhân sự - Hành chính",
    },
    Category {
        name: "Giáo dục",
        slug: "giao-duc-dao-tao",
        value: "Giáo dục - Đào tạo",
    },
    Category {
        name: "Y tế",
        slug: "y-te",
        value: "Y tế",
    },
];

/// Maps a category as it appears in links (label or slug) to the stored
/// value. Anything unrecognised is returned as given.
pub fn canonical_category(raw: &str) -> &str {
    CATEGORIES
        .iter()
        .find(|c| c.name == raw || c.slug == raw)
        .map_or(raw, |c| c.value)
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    #[serde(flatten)]
    pub category: Category,
    pub job_count: usize,
}

/// Counts jobs per category with the same exact-match rule the category
/// filter applies.
pub fn count_by_category(jobs: &[Job]) -> Vec<CategoryCount> {
    CATEGORIES
        .iter()
        .map(|category| {
            let predicate = compile(&FilterState {
                category: category.value.to_string(),
                ..Default::default()
            });
            CategoryCount {
                category: *category,
                job_count: jobs.iter().filter(predicate.as_fn()).count(),
            }
        })
        .collect()
}
