// fn main not required
mod health_check;
mod helpers;

// black-box tests are most robust, as they reflect exactly how browsers
// interact with the site (request type, path, form encoding, cookies)
//
// bundling all test cases in a single tests/api binary keeps the (entirely
// sequential) linking phase down to one pass
