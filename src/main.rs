use serde::Serialize;
use tagstack::models::options::CompilerOptions;
use tagstack::view_factory::ViewFactory;
use tagstack::view_loader;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Serialize, Debug)]
struct Page<'a> {
    title: &'a str,
    items: Vec<&'a str>,
}

fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::new("debug")).init();

    // 前端框架同样使用 {{ }}，这里的子视图改用 [[ ]] 输出服务端变量
    view_loader::register_view(
        "partials.app",
        "changecontenttags('[[', ']]')<div id=\"app\">{{ message }} / [[ title ]]</div>",
    )?;
    view_loader::register_view(
        "home",
        "<h1>{{{ title }}}</h1>\n<p>{{ items }}</p>\n@include('partials.app')\n",
    )?;

    let mut factory = ViewFactory::new(CompilerOptions::new());
    let page = Page {
        title: "Tags & Stacks",
        items: vec!["plain", "escaped"],
    };
    let html = factory.render("home", &page)?;
    println!("{}", html);

    println!(
        "content tags: default={} parent={}",
        factory.engine().default_plain_pair(),
        factory.engine().parent_plain_pair()
    );
    Ok(())
}
