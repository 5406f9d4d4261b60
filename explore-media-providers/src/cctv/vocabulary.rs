//! CCTV filter vocabulary
//!
//! Canonical values are sent upstream verbatim and double as chip labels,
//! except for `channel` whose keys are comma-joined legacy channel ids.

/// Top-level catalog partition (`fc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fc {
    Series,
    Film,
    Cartoon,
    Documentary,
    Special,
}

impl Fc {
    pub const ALL: [Self; 5] = [
        Self::Series,
        Self::Film,
        Self::Cartoon,
        Self::Documentary,
        Self::Special,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Series => "电视剧",
            Self::Film => "电影",
            Self::Cartoon => "动画片",
            Self::Documentary => "纪录片",
            Self::Special => "特别节目",
        }
    }
}

const AREAS: [&str; 10] = [
    "内地（大陆）",
    "港澳台",
    "欧美",
    "日韩",
    "其他",
    "中国大陆",
    "香港",
    "美国",
    "欧洲",
    "泰国",
];

/// Regions offered for one partition; empty when the axis does not apply
#[must_use]
pub fn areas(fc: Fc) -> &'static [&'static str] {
    match fc {
        Fc::Series => &AREAS,
        Fc::Cartoon => &AREAS[..5],
        _ => &[],
    }
}

/// Genres (`sc`) offered for one partition
#[must_use]
pub const fn genres(fc: Fc) -> &'static [&'static str] {
    match fc {
        Fc::Series => &[
            "谍战", "悬疑", "刑侦", "历史", "古装", "武侠", "军事", "战争", "喜剧", "青春", "言情",
            "偶像", "家庭", "年代", "革命", "农村", "都市", "其他",
        ],
        Fc::Film => &[
            "全部", "偶像", "古装", "喜剧", "农村", "军旅", "惊悚", "爱情", "文艺", "战争", "历史",
            "谍战", "传记", "军事", "生活", "现代", "其他",
        ],
        Fc::Cartoon => &[
            "亲子", "搞笑", "冒险", "动作", "宠物", "体育", "益智", "历史", "教育", "校园", "言情",
            "武侠", "经典", "未来", "古代", "神话", "真人", "励志", "热血", "奇幻", "童话", "剧情",
            "夺宝", "其他",
        ],
        Fc::Documentary => &[
            "人文历史", "人物", "军事", "探索", "社会", "自然", "时政", "经济", "科技",
        ],
        Fc::Special => &[
            "新闻", "经济", "综艺", "体育", "军事", "影视", "科教", "戏曲", "青少", "音乐", "社会",
            "文化", "公益", "其他",
        ],
    }
}

/// Partitions where the year axis is shown
pub const YEAR_PARTITIONS: [Fc; 3] = [Fc::Series, Fc::Film, Fc::Documentary];

/// Partitions where the channel axis is shown
pub const CHANNEL_PARTITIONS: [Fc; 2] = [Fc::Documentary, Fc::Special];

/// Years from 2025 down to 1997
#[must_use]
pub fn years() -> Vec<String> {
    (1997..=2025).rev().map(|y| y.to_string()).collect()
}

/// Initial letters A..Z
#[must_use]
pub fn letters() -> Vec<String> {
    ('A'..='Z').map(String::from).collect()
}

/// Channel key (legacy ids) and display label, in upstream order
pub const CHANNELS: [(&str, &str); 16] = [
    ("CCTV-1综合,CCTV-1高清,CCTV-1综合高清", "CCTV-1 综合"),
    ("CCTV-2财经,CCTV-2高清,CCTV-2财经高清", "CCTV-2 财经"),
    ("CCTV-3综艺,CCTV-3高清,CCTV-3综艺高清", "CCTV-3 综艺"),
    ("CCTV-4中文国际,CCTV-4高清,CCTV-4中文国际(亚)高清", "CCTV-4 中文国际"),
    ("CCTV-5体育,CCTV-5高清,CCTV-5体育高清", "CCTV-5 体育"),
    ("CCTV-6电影,CCTV-6高清,CCTV-6电影高清", "CCTV-6 电影"),
    (
        "CCTV-7军事农业,CCTV-7高清,CCTV-7军事农业高清,CCTV-7国防军事高清",
        "CCTV-7 国防军事",
    ),
    ("CCTV-8电视剧,CCTV-8高清,CCTV-8电视剧高清", "CCTV-8 电视剧"),
    ("CCTV-9纪录,CCTV-9高清,CCTV-9纪录高清", "CCTV-9 纪录"),
    ("CCTV-10科教,CCTV-10高清,CCTV-10科教高清", "CCTV-10 科教"),
    ("CCTV-11戏曲,CCTV-11高清", "CCTV-11 戏曲"),
    ("CCTV-12社会与法,CCTV-12高清,CCTV-12社会与法高清", "CCTV-12 社会与法"),
    ("CCTV-13新闻,CCTV-13高清", "CCTV-13 新闻"),
    ("CCTV-14少儿,CCTV-14高清,CCTV-14少儿高清", "CCTV-14 少儿"),
    ("CCTV-15音乐,CCTV-15高清,CCTV-15音乐高清", "CCTV-15 音乐"),
    ("CCTV-17农业农村高清", "CCTV-17农业农村"),
];
