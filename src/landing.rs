//! Static landing-page content and its plain-text rendering.

use std::fmt::Write as _;

pub struct Hero {
    pub headline: &'static str,
    pub tagline: &'static str,
    pub cta: &'static str,
}

/// Before/after example of a post.
pub struct PostPreview {
    pub heading: &'static str,
    pub subheading: &'static str,
    pub original: &'static str,
    pub enhanced: &'static str,
}

pub struct ImpactStat {
    pub label: &'static str,
    pub value: &'static str,
}

pub struct Testimonial {
    pub name: &'static str,
    pub role: &'static str,
    pub message: &'static str,
}

pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

pub struct LinkGroup {
    pub title: &'static str,
    pub links: &'static [&'static str],
}

pub struct SocialLink {
    pub name: &'static str,
    pub url: &'static str,
}

pub const HERO: Hero = Hero {
    headline: "EasyGen",
    tagline: "EasyGen helps professionals create engaging LinkedIn content that drives growth, \
              builds influence, and generates opportunities, all powered by AI.",
    cta: "Generate viral post",
};

pub const PREVIEW: PostPreview = PostPreview {
    heading: "See how EasyGen upgrades your posts",
    subheading: "From rough idea to polished content in seconds.",
    original: "Launching our new tool today. It helps with LinkedIn writing. \
               Give it a try and let us know what you think!",
    enhanced: "🚀 Just launched a tool that helps you write viral LinkedIn posts in seconds.\n\
               \n\
               👉 Say goodbye to writer's block\n\
               💡 Create engaging, authentic content that connects\n\
               \n\
               Curious? Try it out and tell us what you think! #EasyGenAI",
};

pub const IMPACT: [ImpactStat; 2] = [
    ImpactStat {
        label: "Total Posts Generated",
        value: "245,000+",
    },
    ImpactStat {
        label: "Happy Users",
        value: "16,000+",
    },
];

pub const TESTIMONIALS: [Testimonial; 6] = [
    Testimonial {
        name: "Sarah Thompson",
        role: "Career Coach",
        message: "EasyGen helped me go from silent to standout on LinkedIn. I now post twice a week and get real engagement!",
    },
    Testimonial {
        name: "Amit Verma",
        role: "Startup Founder",
        message: "It's like having a content strategist in my pocket. I just tweak and post!",
    },
    Testimonial {
        name: "Nina Patel",
        role: "Marketing Manager",
        message: "The hooks EasyGen generates are 🔥. My last post got 3x more impressions than usual.",
    },
    Testimonial {
        name: "Liam Garcia",
        role: "Freelancer",
        message: "I never knew what to post before. Now I have a content calendar filled for weeks.",
    },
    Testimonial {
        name: "Emily Chen",
        role: "Product Manager",
        message: "Professional, concise, and on-brand. EasyGen nails my tone every time.",
    },
    Testimonial {
        name: "Omar Khan",
        role: "Tech Influencer",
        message: "I've grown 5k followers in 2 months. EasyGen is a must-have for serious creators.",
    },
];

pub const FAQS: [Faq; 5] = [
    Faq {
        question: "How does EasyGen work?",
        answer: "EasyGen uses AI to understand your preferences, industry, and writing style, and generates LinkedIn posts tailored to you in seconds.",
    },
    Faq {
        question: "What makes EasyGen different from ChatGPT?",
        answer: "Unlike general AI, EasyGen is trained specifically for LinkedIn content strategy and includes structure, tone, and CTA optimization.",
    },
    Faq {
        question: "Can EasyGen help me create viral posts?",
        answer: "Yes! EasyGen includes viral hook templates and storytelling frameworks used by top creators to maximize reach and engagement.",
    },
    Faq {
        question: "Is AI content allowed on LinkedIn?",
        answer: "Yes. As long as your content follows LinkedIn's guidelines, AI-assisted writing is completely acceptable.",
    },
    Faq {
        question: "How do I cancel or upgrade my subscription?",
        answer: "You can manage your subscription anytime via your account dashboard. Cancel, upgrade, or change billing cycle instantly.",
    },
];

pub const FOOTER_LINKS: [LinkGroup; 4] = [
    LinkGroup {
        title: "Tools",
        links: &[
            "LinkedIn Post Generator",
            "Hashtag Recommender",
            "Engagement Booster",
        ],
    },
    LinkGroup {
        title: "Resources",
        links: &["50 LinkedIn Hooks", "Viral Post Templates", "Growth Tips"],
    },
    LinkGroup {
        title: "Navigation",
        links: &["Pricing", "Login", "Sign Up"],
    },
    LinkGroup {
        title: "Legal",
        links: &["Terms of Service", "Privacy Policy"],
    },
];

pub const SOCIAL_LINKS: [SocialLink; 4] = [
    SocialLink {
        name: "Twitter",
        url: "#",
    },
    SocialLink {
        name: "LinkedIn",
        url: "#",
    },
    SocialLink {
        name: "Instagram",
        url: "#",
    },
    SocialLink {
        name: "YouTube",
        url: "#",
    },
];

pub const CONTACT_EMAIL: &str = "hello@easygenai.com";

/// FAQ list where at most one answer is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaqAccordion {
    open: Option<usize>,
}

impl Default for FaqAccordion {
    fn default() -> Self {
        Self { open: Some(0) }
    }
}

impl FaqAccordion {
    pub fn open_index(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    /// Expand `index`, or collapse it if it is the expanded one.
    /// Out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if index >= FAQS.len() {
            return;
        }
        self.open = if self.is_open(index) { None } else { Some(index) };
    }
}

pub fn render_hero() -> String {
    format!("{}\n{}\n\n  [{}]\n", HERO.headline, HERO.tagline, HERO.cta)
}

pub fn render_preview() -> String {
    let mut out = format!("{}\n{}\n\n", PREVIEW.heading, PREVIEW.subheading);
    let _ = writeln!(out, "Your Original Draft:\n  {}\n", PREVIEW.original);
    let _ = writeln!(out, "Enhanced with EasyGen:");
    for line in PREVIEW.enhanced.lines() {
        let _ = writeln!(out, "  {line}");
    }
    out
}

pub fn render_impact() -> String {
    let mut out = String::from("Trusted by professionals worldwide\n");
    for stat in &IMPACT {
        let _ = writeln!(out, "  {:<24}{}", stat.label, stat.value);
    }
    out
}

pub fn render_testimonials() -> String {
    let mut out = String::from("What creators love about EasyGen\n\n");
    for testimonial in &TESTIMONIALS {
        let _ = writeln!(
            out,
            "  \"{}\"\n    - {}, {}\n",
            testimonial.message, testimonial.name, testimonial.role
        );
    }
    out
}

pub fn render_faq(accordion: &FaqAccordion) -> String {
    let mut out = String::from("Frequently Asked Questions\n\n");
    for (index, faq) in FAQS.iter().enumerate() {
        let marker = if accordion.is_open(index) { '-' } else { '+' };
        let _ = writeln!(out, "  {marker} {}. {}", index + 1, faq.question);
        if accordion.is_open(index) {
            let _ = writeln!(out, "      {}", faq.answer);
        }
    }
    out
}

pub fn render_footer() -> String {
    let mut out = String::new();
    for group in &FOOTER_LINKS {
        let _ = writeln!(out, "{}: {}", group.title, group.links.join(" · "));
    }
    let socials: Vec<&str> = SOCIAL_LINKS.iter().map(|s| s.name).collect();
    let _ = writeln!(out, "Follow us: {}", socials.join(" · "));
    let _ = writeln!(out, "Email us: {CONTACT_EMAIL}");
    out
}

/// Every section in page order.
pub fn render_landing(accordion: &FaqAccordion) -> String {
    [
        render_hero(),
        render_preview(),
        render_impact(),
        render_testimonials(),
        render_faq(accordion),
        render_footer(),
    ]
    .join("\n")
}
