//! Static templates for generated sites: markup per archetype, the
//! theme-parameterized stylesheet, the reverse-proxy config, and the
//! container descriptor.
//!
//! Placeholders use `{token}` syntax and are substituted with plain string
//! replacement — the templates contain literal CSS braces, so `format!` is
//! not an option here.

use crate::types::{Archetype, Theme};

// The markup contains `"#` sequences (quoted fragment anchors), so the HTML
// constants need double-hash raw-string delimiters.
const PORTFOLIO_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{site_name} - Portfolio</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body>
    <header>
        <nav>
            <h1>{site_name}</h1>
            <ul>
                <li><a href="#about">About</a></li>
                <li><a href="#projects">Projects</a></li>
                <li><a href="#contact">Contact</a></li>
            </ul>
        </nav>
    </header>

    <main>
        <section id="hero">
            <h2>Welcome to My Portfolio</h2>
            <p>Creative professional showcasing my best work</p>
        </section>

        <section id="about">
            <h2>About Me</h2>
            <p>I'm a passionate creator with a love for building amazing things.</p>
        </section>

        <section id="projects">
            <h2>My Projects</h2>
            <div class="project-grid">
                <div class="project-card">
                    <h3>Project One</h3>
                    <p>A fantastic project that showcases my skills.</p>
                </div>
                <div class="project-card">
                    <h3>Project Two</h3>
                    <p>Another amazing project with great results.</p>
                </div>
                <div class="project-card">
                    <h3>Project Three</h3>
                    <p>Yet another successful project completed.</p>
                </div>
            </div>
        </section>

        <section id="contact">
            <h2>Get In Touch</h2>
            <p>Email: hello@{site_name}.com</p>
        </section>
    </main>

    <footer>
        <p>&copy; 2026 {site_name}. All rights reserved.</p>
    </footer>
</body>
</html>
"##;

const LANDING_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{site_name}</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body>
    <header>
        <nav>
            <h1>{site_name}</h1>
            <a href="#signup" class="cta-button">Get Started</a>
        </nav>
    </header>

    <main>
        <section id="hero">
            <h2>Transform Your Business Today</h2>
            <p>The best solution for modern businesses</p>
            <a href="#signup" class="cta-button">Sign Up Now</a>
        </section>

        <section id="features">
            <h2>Why Choose Us</h2>
            <div class="feature-grid">
                <div class="feature">
                    <h3>Fast</h3>
                    <p>Lightning-fast performance</p>
                </div>
                <div class="feature">
                    <h3>Reliable</h3>
                    <p>99.9% uptime guarantee</p>
                </div>
                <div class="feature">
                    <h3>Secure</h3>
                    <p>Enterprise-grade security</p>
                </div>
            </div>
        </section>

        <section id="signup">
            <h2>Ready to Get Started?</h2>
            <p>Join thousands of satisfied customers today!</p>
            <form>
                <input type="email" placeholder="Enter your email">
                <button type="submit">Sign Up</button>
            </form>
        </section>
    </main>

    <footer>
        <p>&copy; 2026 {site_name}. All rights reserved.</p>
    </footer>
</body>
</html>
"##;

const BLOG_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{site_name} Blog</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body>
    <header>
        <nav>
            <h1>{site_name}</h1>
            <ul>
                <li><a href="#home">Home</a></li>
                <li><a href="#posts">Posts</a></li>
                <li><a href="#about">About</a></li>
            </ul>
        </nav>
    </header>

    <main>
        <section id="hero">
            <h2>Welcome to {site_name}</h2>
            <p>Thoughts, stories, and ideas</p>
        </section>

        <section id="posts">
            <article class="blog-post">
                <h3>Getting Started with Web Development</h3>
                <p class="post-meta">January 22, 2026</p>
                <p>Lorem ipsum dolor sit amet, consectetur adipiscing elit...</p>
                <a href="#" class="read-more">Read More</a>
            </article>

            <article class="blog-post">
                <h3>The Future of Technology</h3>
                <p class="post-meta">January 20, 2026</p>
                <p>Sed do eiusmod tempor incididunt ut labore et dolore magna...</p>
                <a href="#" class="read-more">Read More</a>
            </article>

            <article class="blog-post">
                <h3>Best Practices for Modern Development</h3>
                <p class="post-meta">January 18, 2026</p>
                <p>Ut enim ad minim veniam, quis nostrud exercitation ullamco...</p>
                <a href="#" class="read-more">Read More</a>
            </article>
        </section>
    </main>

    <footer>
        <p>&copy; 2026 {site_name}. All rights reserved.</p>
    </footer>
</body>
</html>
"##;

const STYLESHEET_TEMPLATE: &str = r#"* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
    line-height: 1.6;
    color: {text};
    background-color: {background};
}

header {
    background-color: {card};
    padding: 1rem 2rem;
    box-shadow: 0 2px 4px rgba(0,0,0,0.1);
}

nav {
    display: flex;
    justify-content: space-between;
    align-items: center;
    max-width: 1200px;
    margin: 0 auto;
}

nav h1 {
    color: {primary};
    font-size: 1.5rem;
}

nav ul {
    display: flex;
    list-style: none;
    gap: 2rem;
}

nav a {
    color: {text};
    text-decoration: none;
    transition: color 0.3s;
}

nav a:hover {
    color: {primary};
}

main {
    max-width: 1200px;
    margin: 0 auto;
    padding: 2rem;
}

section {
    margin: 4rem 0;
}

#hero {
    text-align: center;
    padding: 4rem 2rem;
}

#hero h2 {
    font-size: 3rem;
    color: {primary};
    margin-bottom: 1rem;
}

#hero p {
    font-size: 1.25rem;
    margin-bottom: 2rem;
}

h2 {
    font-size: 2rem;
    margin-bottom: 1.5rem;
    color: {primary};
}

.cta-button {
    display: inline-block;
    background-color: {primary};
    color: white;
    padding: 0.75rem 2rem;
    border-radius: 0.5rem;
    text-decoration: none;
    font-weight: 600;
    transition: transform 0.2s, box-shadow 0.2s;
}

.cta-button:hover {
    transform: translateY(-2px);
    box-shadow: 0 4px 12px rgba(0,0,0,0.15);
}

.project-grid, .feature-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
    gap: 2rem;
    margin-top: 2rem;
}

.project-card, .feature {
    background-color: {card};
    padding: 2rem;
    border-radius: 0.5rem;
    box-shadow: 0 2px 8px rgba(0,0,0,0.1);
    transition: transform 0.2s;
}

.project-card:hover, .feature:hover {
    transform: translateY(-4px);
    box-shadow: 0 4px 12px rgba(0,0,0,0.15);
}

.project-card h3, .feature h3 {
    color: {primary};
    margin-bottom: 0.5rem;
}

.blog-post {
    background-color: {card};
    padding: 2rem;
    border-radius: 0.5rem;
    margin-bottom: 2rem;
    box-shadow: 0 2px 8px rgba(0,0,0,0.1);
}

.blog-post h3 {
    color: {primary};
    margin-bottom: 0.5rem;
}

.post-meta {
    color: #6b7280;
    font-size: 0.875rem;
    margin-bottom: 1rem;
}

.read-more {
    color: {primary};
    text-decoration: none;
    font-weight: 600;
}

.read-more:hover {
    text-decoration: underline;
}

form {
    display: flex;
    gap: 1rem;
    max-width: 500px;
    margin: 2rem auto;
}

input[type="email"] {
    flex: 1;
    padding: 0.75rem;
    border: 2px solid #e5e7eb;
    border-radius: 0.5rem;
    font-size: 1rem;
}

button[type="submit"] {
    background-color: {primary};
    color: white;
    padding: 0.75rem 2rem;
    border: none;
    border-radius: 0.5rem;
    font-weight: 600;
    cursor: pointer;
    transition: transform 0.2s;
}

button[type="submit"]:hover {
    transform: translateY(-2px);
}

footer {
    background-color: {card};
    text-align: center;
    padding: 2rem;
    margin-top: 4rem;
}

@media (max-width: 768px) {
    nav {
        flex-direction: column;
        gap: 1rem;
    }

    nav ul {
        flex-direction: column;
        text-align: center;
        gap: 1rem;
    }

    #hero h2 {
        font-size: 2rem;
    }

    form {
        flex-direction: column;
    }
}
"#;

/// Reverse-proxy config serving the generated markup as the default document.
pub const NGINX_CONF: &str = r#"server {
    listen 80;
    server_name localhost;
    root /usr/share/nginx/html;
    index index.html;

    location / {
        try_files $uri $uri/ /index.html;
    }
}
"#;

/// Container descriptor: copy all site files, serve them via the generated
/// proxy config. Deterministic for a given site — no timestamps, no
/// environment-dependent content.
pub const DOCKERFILE: &str = r#"FROM nginx:alpine

COPY . /usr/share/nginx/html/

COPY nginx.conf /etc/nginx/conf.d/default.conf

EXPOSE 80

CMD ["nginx", "-g", "daemon off;"]
"#;

/// Render the index document for an archetype.
pub fn render_index(archetype: Archetype, site_name: &str) -> String {
    let template = match archetype.layout() {
        Archetype::Portfolio => PORTFOLIO_HTML,
        Archetype::Blog => BLOG_HTML,
        Archetype::Landing | Archetype::Business => LANDING_HTML,
    };
    template.replace("{site_name}", site_name)
}

/// Render the stylesheet for a theme.
pub fn render_stylesheet(theme: Theme) -> String {
    STYLESHEET_TEMPLATE
        .replace("{primary}", theme.primary)
        .replace("{background}", theme.background)
        .replace("{text}", theme.text)
        .replace("{card}", theme.card)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_substitutes_site_name() {
        let html = render_index(Archetype::Blog, "my blog");
        assert!(html.contains("<title>my blog Blog</title>"));
        assert!(!html.contains("{site_name}"));
    }

    #[test]
    fn markup_keeps_quoted_fragment_anchors() {
        let portfolio = render_index(Archetype::Portfolio, "jane");
        assert!(portfolio.contains(r##"href="#about""##));
        assert!(portfolio.contains(r##"href="#projects""##));
        let landing = render_index(Archetype::Landing, "acme");
        assert!(landing.contains(r##"href="#signup""##));
    }

    #[test]
    fn business_renders_landing_markup() {
        let business = render_index(Archetype::Business, "acme");
        let landing = render_index(Archetype::Landing, "acme");
        assert_eq!(business, landing);
    }

    #[test]
    fn stylesheet_substitutes_all_tokens() {
        let css = render_stylesheet(Theme::DARK);
        assert!(css.contains("#0f172a"));
        assert!(css.contains("#2563eb"));
        assert!(!css.contains("{primary}"));
        assert!(!css.contains("{card}"));
    }
}
