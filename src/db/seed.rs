use chrono::{DateTime, TimeZone, Utc};

use crate::article::{Article, DEFAULT_ARTICLE_IMG_URL};
use crate::comment::Comment;
use crate::topic::Topic;
use crate::user::User;

fn at(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .expect("seed timestamps are in range")
}

pub fn topics() -> Vec<Topic> {
    vec![
        ("mitch", "The man, the Mitch, the legend"),
        ("cats", "Not dogs"),
        ("paper", "what books are made of"),
    ]
    .into_iter()
    .map(|(slug, description)| Topic {
        slug: slug.to_string(),
        description: description.to_string(),
    })
    .collect()
}

pub fn users() -> Vec<User> {
    vec![
        ("butter_bridge", "jonny", "https://www.healthytherapies.com/wp-content/uploads/2016/06/Lime3.jpg"),
        ("icellusedkars", "sam", "https://avatars2.githubusercontent.com/u/24604688?s=460&v=4"),
        ("rogersop", "paul", "https://avatars2.githubusercontent.com/u/24394918?s=400&v=4"),
        ("lurker", "do_nothing", "https://www.golenbock.com/wp-content/uploads/2015/01/placeholder-user.png"),
    ]
    .into_iter()
    .map(|(username, name, avatar_url)| User {
        username: username.to_string(),
        name: name.to_string(),
        avatar_url: avatar_url.to_string(),
    })
    .collect()
}

pub fn articles() -> Vec<Article> {
    let rows: Vec<(&str, &str, &str, &str, i64, i32)> = vec![
        ("Living in the shadow of a great man", "mitch", "butter_bridge", "I find this existence challenging", 1594329060000, 100),
        ("Sony Vaio; or, The Laptop", "mitch", "icellusedkars", "Call me Mitchell. Some years ago I bought a laptop.", 1602828180000, 0),
        ("Eight pug gifs that remind me of mitch", "mitch", "icellusedkars", "some gifs", 1604394720000, 0),
        ("Student SUES Mitch!", "mitch", "rogersop", "We all love Mitch and his wonderful, unique typing style.", 1588731240000, 0),
        ("UNCOVERED: catspiracy to bring down democracy", "cats", "rogersop", "Bastet walks amongst us, and the cats are taking arms!", 1596464040000, 0),
        ("A", "mitch", "icellusedkars", "Delicious tin of cat food", 1602986400000, 0),
        ("Z", "mitch", "icellusedkars", "I was hungry.", 1578406080000, 0),
        ("Does Mitch predate civilisation?", "mitch", "icellusedkars", "Archaeologists have uncovered a gigantic statue.", 1587089280000, 0),
        ("They're not exactly dogs, are they?", "mitch", "butter_bridge", "Well? Think about it.", 1591438200000, 0),
        ("Seven inspirational thoughts from Mitch", "mitch", "rogersop", "Who are we kidding, there is only one, and it's Mitch!", 1589433300000, 0),
        ("Am I a cat?", "mitch", "icellusedkars", "Having run out of ideas for articles, I am staring at the wall.", 1579126860000, 0),
        ("Moustache", "mitch", "butter_bridge", "Have you seen the size of that thing?", 1602419040000, 0),
        ("Another article about Mitch", "mitch", "butter_bridge", "There will never be enough articles about Mitch!", 1602419040000, 0),
    ];
    rows.into_iter()
    .enumerate()
    .map(|(i, (title, topic, author, body, created_at, votes))| Article {
        article_id: i as i32 + 1,
        title: title.to_string(),
        topic: topic.to_string(),
        author: author.to_string(),
        body: body.to_string(),
        created_at: at(created_at),
        votes,
        article_img_url: DEFAULT_ARTICLE_IMG_URL.to_string(),
    })
    .collect()
}

pub fn comments() -> Vec<Comment> {
    let rows: Vec<(i32, &str, &str, i32, i64)> = vec![
        (9, "butter_bridge", "Oh, I've got compassion running out of my nose, pal!", 16, 1586179020000),
        (1, "butter_bridge", "The beautiful thing about treasure is that it exists.", 14, 1604113380000),
        (1, "icellusedkars", "Replacing the quiet elegance of the dark suit and tie.", 100, 1583025180000),
        (1, "icellusedkars", "I carry a log, yes. Is it funny to you? It is not to me.", -100, 1582459260000),
        (1, "icellusedkars", "I hate streaming noses", 0, 1604437200000),
        (1, "icellusedkars", "I hate streaming eyes even more", 0, 1584205320000),
        (1, "icellusedkars", "Lobster pot", 0, 1586642520000),
        (1, "icellusedkars", "Delicious crackerbreads", 0, 1586642520000),
        (1, "icellusedkars", "Superficially charming", 0, 1578406080000),
        (3, "icellusedkars", "git push origin master", 0, 1592641440000),
        (3, "icellusedkars", "Ambidextrous marsupial", 0, 1600560600000),
        (1, "icellusedkars", "Massive intercranial brain haemorrhage", 0, 1583133000000),
        (1, "icellusedkars", "Fruit pastilles", 0, 1602433380000),
        (5, "icellusedkars", "What do you see? I have no idea where this will lead us.", 16, 1591682400000),
        (5, "butter_bridge", "I am 100% sure that we're not completely sure.", 1, 1605915720000),
        (6, "butter_bridge", "This is a bad article name", 1, 1602516540000),
        (9, "icellusedkars", "The owls are not what they seem.", 20, 1584205320000),
        (1, "butter_bridge", "This morning, I showered for nine minutes.", 16, 1595294400000),
    ];
    rows.into_iter()
    .enumerate()
    .map(|(i, (article_id, author, body, votes, created_at))| Comment {
        comment_id: i as i32 + 1,
        body: body.to_string(),
        article_id,
        author: author.to_string(),
        votes,
        created_at: at(created_at),
    })
    .collect()
}
